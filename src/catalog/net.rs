//! Sockets, name lookups, and I/O multiplexing.

use super::{POSIX, WIN32};
use crate::core::facility::Prerequisite::{OneOf, Selected};
use crate::core::facility::{FacilitySpec, OptionSpec, Prerequisite, Stage};
use crate::core::import::DeclarationImport as Hdr;

const AFTER_NETWORKING: &[Prerequisite] = &[Selected("networking")];

const NETDB: &[Hdr] = &[Hdr::SysSocketH, Hdr::NetinetInH, Hdr::NetdbH];

/// A name-service call that is only used when networking is.
const fn lookup(
    id: &'static str,
    description: &'static str,
    options: &'static [OptionSpec],
) -> FacilitySpec {
    FacilitySpec {
        id,
        description,
        stage: Stage::Composite,
        options,
    }
}

pub(super) const FACILITIES: &[FacilitySpec] = &[
    FacilitySpec {
        id: "socket",
        description: "BSD socket creation",
        stage: Stage::Base,
        options: &[OptionSpec::new("socket")
            .requires(&["has-socket"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::SysSocketH])],
    },
    FacilitySpec {
        id: "networking",
        description: "socket-based networking",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("winsock")
                .families(WIN32)
                .exports(&["USE_NETWORKING"]),
            OptionSpec::new("bsd_sockets")
                .after(&[OneOf("socket", &["socket"])])
                .exports(&["USE_NETWORKING"]),
        ],
    },
    FacilitySpec {
        id: "hstrerror",
        description: "resolver error messages",
        stage: Stage::Base,
        options: &[OptionSpec::new("hstrerror")
            .requires(&["has-hstrerror"])
            .imports(&[Hdr::NetdbH])],
    },
    lookup(
        "gethostname",
        "local host name",
        &[OptionSpec::new("gethostname")
            .requires(&["has-gethostname"])
            .after(AFTER_NETWORKING)
            .imports(&[Hdr::UnistdH])],
    ),
    lookup(
        "getpeername",
        "remote socket address",
        &[OptionSpec::new("getpeername")
            .requires(&["has-getpeername"])
            .after(AFTER_NETWORKING)
            .imports(&[Hdr::SysSocketH])],
    ),
    lookup(
        "getsockname",
        "local socket address",
        &[OptionSpec::new("getsockname")
            .requires(&["has-getsockname"])
            .after(AFTER_NETWORKING)
            .imports(&[Hdr::SysSocketH])],
    ),
    lookup(
        "inet-pton",
        "textual address parsing",
        &[OptionSpec::new("inet_pton")
            .requires(&["has-inet-pton"])
            .after(AFTER_NETWORKING)
            .imports(&[Hdr::SysTypesH, Hdr::SysSocketH, Hdr::NetinetInH, Hdr::ArpaInetH])],
    ),
    lookup(
        "getaddrinfo",
        "protocol-independent address lookup",
        &[OptionSpec::new("getaddrinfo")
            .requires(&["has-getaddrinfo"])
            .after(AFTER_NETWORKING)
            .imports(&[Hdr::SysTypesH, Hdr::SysSocketH, Hdr::NetdbH])],
    ),
    lookup(
        "gethostbyname",
        "host lookup by name",
        &[OptionSpec::new("gethostbyname")
            .requires(&["has-gethostbyname"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    lookup(
        "gethostbyaddr",
        "host lookup by address",
        &[OptionSpec::new("gethostbyaddr")
            .requires(&["has-gethostbyaddr"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    lookup(
        "getservbyname",
        "service lookup by name",
        &[OptionSpec::new("getservbyname")
            .requires(&["has-getservbyname"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    lookup(
        "getservbyport",
        "service lookup by port",
        &[OptionSpec::new("getservbyport")
            .requires(&["has-getservbyport"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    lookup(
        "getprotobyname",
        "protocol lookup by name",
        &[OptionSpec::new("getprotobyname")
            .requires(&["has-getprotobyname"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    lookup(
        "getprotobynumber",
        "protocol lookup by number",
        &[OptionSpec::new("getprotobynumber")
            .requires(&["has-getprotobynumber"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    lookup(
        "getnetbyname",
        "network lookup by name",
        &[OptionSpec::new("getnetbyname")
            .requires(&["has-getnetbyname"])
            .after(AFTER_NETWORKING)
            .imports(NETDB)],
    ),
    FacilitySpec {
        id: "select-multiplexing",
        description: "wait on several devices at once",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("MsgWaitForMultipleObjects")
                .requires(&["has-msgwaitformultipleobjects"]),
            // has-poll is masked unless poll is enabled for select.
            OptionSpec::new("poll")
                .requires(&["has-poll"])
                .imports(&[Hdr::PollH]),
            OptionSpec::new("select").requires(&["has-select"]),
        ],
    },
    FacilitySpec {
        id: "poll-timeout",
        description: "poll with a nanosecond timeout",
        stage: Stage::Refinement,
        options: &[OptionSpec::new("ppoll")
            .requires(&["has-ppoll"])
            .after(&[OneOf("select-multiplexing", &["poll"])])],
    },
    FacilitySpec {
        id: "select-or-poll",
        description: "descriptor-set based multiplexing",
        stage: Stage::Composite,
        options: &[OptionSpec::new("select_or_poll")
            .after(&[OneOf("select-multiplexing", &["poll", "select"])])],
    },
    FacilitySpec {
        id: "async-device-select-abort",
        description: "abort a blocking select from another thread",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("win32")
                .families(WIN32)
                .exports(&["USE_ASYNC_DEVICE_SELECT_ABORT"]),
            OptionSpec::new("thread_system")
                .unless(&["no-thread-system"])
                .exports(&["USE_ASYNC_DEVICE_SELECT_ABORT"]),
        ],
    },
];
