//! Terminal control, pseudo-terminals, and the built-in line editor.

use super::NOT_WIN32;
use crate::core::facility::Prerequisite::{NoneOf, Selected};
use crate::core::facility::{FacilitySpec, OptionSpec, Stage};
use crate::core::import::DeclarationImport as Hdr;

pub(super) const FACILITIES: &[FacilitySpec] = &[
    FacilitySpec {
        id: "tcgetsetattr",
        description: "terminal attributes",
        stage: Stage::Base,
        options: &[OptionSpec::new("tcgetsetattr")
            .requires(&["has-termios-h"])
            .imports(&[Hdr::TermiosH, Hdr::UnistdH])],
    },
    FacilitySpec {
        id: "pty-interface",
        description: "pseudo-terminal allocation",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("openpty")
                .requires(&["has-openpty"])
                .imports(&[
                    Hdr::PtyH,
                    Hdr::UtilH,
                    Hdr::SysTypesH,
                    Hdr::SysIoctlH,
                    Hdr::TermiosH,
                    Hdr::LibutilH,
                ]),
            OptionSpec::new("getpt")
                .requires(&["has-getpt"])
                .imports(&[Hdr::StdlibH, Hdr::StroptsH]),
        ],
    },
    FacilitySpec {
        id: "pty-name",
        description: "name of the pseudo-terminal slave",
        stage: Stage::Refinement,
        // openpty hands back both ends, so the name is never looked up.
        options: &[OptionSpec::new("ptsname")
            .requires(&["has-ptsname"])
            .after(&[NoneOf("pty-interface", &["openpty"])])
            .imports(&[Hdr::StdlibH, Hdr::StroptsH])],
    },
    FacilitySpec {
        id: "curses",
        description: "terminal capability database",
        stage: Stage::Base,
        options: &[OptionSpec::new("builtin").exports(&["USE_CURSES"])],
    },
    FacilitySpec {
        id: "line-editor",
        description: "interactive line editing",
        stage: Stage::Base,
        options: &[OptionSpec::new("builtin").exports(&[
            "USE_LINEEDITOR",
            "LINEEDITOR_WITH_NONBLOCKING_IO",
            "LINEEDITOR_SUPPORT_F5_TO_F12",
            "LINEEDITOR_SUPPORT_ALTERNATE_ESCAPES",
            "LINEEDITOR_REPORT_CHAR_ENCODING_ERRORS",
        ])],
    },
    FacilitySpec {
        id: "line-editor-clipboard",
        description: "line editor kill ring kept in process",
        stage: Stage::Base,
        options: &[OptionSpec::new("local")
            .families(NOT_WIN32)
            .after(&[Selected("line-editor")])
            .exports(&["LINEEDITOR_WITH_LOCAL_CLIPBOARD"])],
    },
];
