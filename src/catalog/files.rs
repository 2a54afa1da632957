//! Filesystem operations.
//!
//! Directory-relative `*at` variants are only used once `open` itself chose
//! `openat`, which in turn needs long-path support. A platform reporting an
//! `*at` call has the base call too, so the `*at` flag alone is enough.

use super::{NOT_WIN32, POSIX};
use crate::core::facility::Prerequisite::{OneOf, Selected};
use crate::core::facility::{FacilitySpec, OptionSpec, Prerequisite, Stage};
use crate::core::import::DeclarationImport as Hdr;

const AFTER_OPENAT: &[Prerequisite] = &[OneOf("open", &["openat"])];

pub(super) const FACILITIES: &[FacilitySpec] = &[
    FacilitySpec {
        id: "open",
        description: "open a file",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("openat")
                .requires(&["has-openat"])
                .families(NOT_WIN32)
                .after(&[Selected("long-path")])
                .imports(&[Hdr::SysTypesH, Hdr::SysStatH, Hdr::FcntlH])
                .exports(&["USE_open", "USE_openat"]),
            OptionSpec::new("open")
                .requires(&["has-open"])
                .families(NOT_WIN32)
                .imports(&[Hdr::SysTypesH, Hdr::SysStatH, Hdr::FcntlH]),
        ],
    },
    FacilitySpec {
        id: "opendir",
        description: "read directory entries",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("fdopendir")
                .requires(&["has-fdopendir"])
                .families(NOT_WIN32)
                .after(AFTER_OPENAT)
                .imports(&[Hdr::SysTypesH, Hdr::DirentH])
                .exports(&["USE_opendir", "USE_fdopendir"]),
            OptionSpec::new("opendir")
                .requires(&["has-opendir"])
                .families(NOT_WIN32)
                .imports(&[Hdr::SysTypesH, Hdr::DirentH]),
        ],
    },
    FacilitySpec {
        id: "remove",
        description: "remove a file or empty directory",
        stage: Stage::Base,
        options: &[OptionSpec::new("remove")
            .requires(&["has-remove"])
            .families(NOT_WIN32)
            .exports(&["USE_remove_dir", "USE_remove_file"])],
    },
    FacilitySpec {
        id: "rename",
        description: "rename a file",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("renameat")
                .requires(&["has-renameat"])
                .families(NOT_WIN32)
                .after(AFTER_OPENAT)
                .exports(&["USE_rename", "USE_renameat"]),
            OptionSpec::new("rename")
                .requires(&["has-rename"])
                .families(NOT_WIN32),
        ],
    },
    FacilitySpec {
        id: "atomic-rename",
        description: "rename with no-replace semantics",
        stage: Stage::Refinement,
        options: &[
            OptionSpec::new("renameat2")
                .requires(&["has-renameat2"])
                .after(&[OneOf("rename", &["renameat"])]),
            OptionSpec::new("renameatx_np")
                .requires(&["has-renameatx-np"])
                .after(&[OneOf("rename", &["renameat"])]),
        ],
    },
    FacilitySpec {
        id: "renameat2-syscall",
        description: "renameat2 through a raw system call",
        stage: Stage::Refinement,
        options: &[OptionSpec::new("renameat2_syscall")
            .requires(&["has-sys-syscall-h", "has-linux-fs-h"])
            .after(&[OneOf("atomic-rename", &["renameat2"])])
            .imports(&[Hdr::SysSyscallH, Hdr::LinuxFsH])],
    },
    FacilitySpec {
        id: "mkdir",
        description: "create a directory",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("mkdirat")
                .requires(&["has-mkdirat"])
                .families(NOT_WIN32)
                .after(AFTER_OPENAT)
                .exports(&["USE_mkdir", "USE_mkdirat"]),
            OptionSpec::new("mkdir")
                .requires(&["has-mkdir"])
                .families(NOT_WIN32),
        ],
    },
    FacilitySpec {
        id: "stat",
        description: "file metadata",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("stat64")
                .requires(&["has-stat64", "has-struct-stat64"])
                .families(NOT_WIN32)
                .imports(&[Hdr::SysTypesH, Hdr::SysStatH, Hdr::UnistdH])
                .exports(&["USE_stat"]),
            OptionSpec::new("fstatat")
                .requires(&["has-fstatat"])
                .families(NOT_WIN32)
                .after(AFTER_OPENAT)
                .imports(&[Hdr::SysTypesH, Hdr::SysStatH, Hdr::UnistdH])
                .exports(&["USE_stat", "USE_fstatat"]),
            OptionSpec::new("stat")
                .requires(&["has-stat"])
                .families(NOT_WIN32)
                .imports(&[Hdr::SysTypesH, Hdr::SysStatH, Hdr::UnistdH]),
        ],
    },
    FacilitySpec {
        id: "getcwd",
        description: "current working directory",
        stage: Stage::Base,
        options: &[OptionSpec::new("getcwd")
            .requires(&["has-getcwd"])
            .imports(&[Hdr::UnistdH])],
    },
    FacilitySpec {
        id: "chdir",
        description: "change working directory",
        stage: Stage::Base,
        options: &[OptionSpec::new("chdir").requires(&["has-chdir"]).families(POSIX)],
    },
    FacilitySpec {
        id: "link",
        description: "hard links",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("linkat")
                .requires(&["has-link", "has-linkat"])
                .families(POSIX)
                .after(AFTER_OPENAT)
                .exports(&["USE_link", "USE_linkat"]),
            OptionSpec::new("link").requires(&["has-link"]).families(POSIX),
        ],
    },
    FacilitySpec {
        id: "mkfifo",
        description: "named pipes",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("mkfifoat")
                .requires(&["has-mkfifo", "has-mkfifoat"])
                .families(POSIX)
                .after(AFTER_OPENAT)
                .exports(&["USE_mkfifo", "USE_mkfifoat"]),
            OptionSpec::new("mkfifo").requires(&["has-mkfifo"]).families(POSIX),
        ],
    },
    FacilitySpec {
        id: "rmdir",
        description: "remove a directory",
        stage: Stage::Base,
        options: &[OptionSpec::new("rmdir").requires(&["has-rmdir"]).families(POSIX)],
    },
    FacilitySpec {
        id: "symlink",
        description: "symbolic links",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("symlinkat")
                .requires(&["has-symlink", "has-symlinkat"])
                .families(POSIX)
                .after(AFTER_OPENAT)
                .exports(&["USE_symlink", "USE_symlinkat"]),
            OptionSpec::new("symlink").requires(&["has-symlink"]).families(POSIX),
        ],
    },
    FacilitySpec {
        id: "unlink",
        description: "remove a directory entry",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("unlinkat")
                .requires(&["has-unlink", "has-unlinkat"])
                .families(POSIX)
                .after(AFTER_OPENAT)
                .exports(&["USE_unlink", "USE_unlinkat"]),
            OptionSpec::new("unlink").requires(&["has-unlink"]).families(POSIX),
        ],
    },
    FacilitySpec {
        id: "executable-path",
        description: "path of the running executable",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("_NSGetExecutablePath")
                .requires(&["has-nsgetexecutablepath"])
                .imports(&[Hdr::MachODyldH]),
            OptionSpec::new("readlinkat")
                .requires(&["has-readlink", "has-readlinkat"])
                .after(AFTER_OPENAT)
                .imports(&[Hdr::UnistdH])
                .exports(&["USE_readlink", "USE_readlinkat"]),
            OptionSpec::new("readlink")
                .requires(&["has-readlink"])
                .imports(&[Hdr::UnistdH]),
        ],
    },
    FacilitySpec {
        id: "file-times",
        description: "change file access and modification times",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("utimes").requires(&["has-utimes"]),
            OptionSpec::new("SetFileTime").requires(&["has-setfiletime"]),
        ],
    },
];
