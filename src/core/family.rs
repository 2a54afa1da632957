//! OS families and target platforms.
//!
//! `OsFamily` is the coarse classification the resolver branches on
//! (POSIX-like, handle-based Win32, or a generic fallback). Each family owns
//! one `FamilyStrategy`: capabilities it guarantees regardless of probing and
//! the socket conventions the binding emitter uses.
//!
//! `TargetPlatform` is the finer identity used to scope overrides for
//! platforms whose probed capabilities are misleading.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// POSIX-like systems (file descriptors, errno)
    Posix,
    /// Handle-based Windows systems (SOCKET handles, WSAGetLastError)
    Win32,
    /// Neither of the above
    Generic,
}

impl OsFamily {
    /// All families, in classification priority order.
    pub const ALL: &'static [OsFamily] = &[OsFamily::Posix, OsFamily::Win32, OsFamily::Generic];

    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Posix => "posix",
            OsFamily::Win32 => "win32",
            OsFamily::Generic => "generic",
        }
    }

    /// Look up a family by the option name the classification facility uses.
    pub fn from_option(option: &str) -> Option<OsFamily> {
        OsFamily::ALL.iter().copied().find(|f| f.as_str() == option)
    }

    /// The resolution strategy for this family.
    pub fn strategy(&self) -> &'static FamilyStrategy {
        match self {
            OsFamily::Posix => &POSIX_STRATEGY,
            OsFamily::Win32 => &WIN32_STRATEGY,
            OsFamily::Generic => &GENERIC_STRATEGY,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OsFamily {
    type Err = FamilyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "posix" | "unix" => Ok(OsFamily::Posix),
            "win32" | "windows" => Ok(OsFamily::Win32),
            "generic" => Ok(OsFamily::Generic),
            _ => Err(FamilyParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid OS family.
#[derive(Debug, Clone)]
pub struct FamilyParseError(pub String);

impl fmt::Display for FamilyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid OS family '{}', valid values: posix, win32, generic",
            self.0
        )
    }
}

impl std::error::Error for FamilyParseError {}

/// How a family reports socket results and errors.
///
/// POSIX-style platforms signal failure with a negative return and report
/// the cause through `errno`; handle-based platforms compare against
/// distinguished sentinels (`SOCKET_ERROR`, `INVALID_SOCKET`) and report the
/// cause through `WSAGetLastError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketConvention {
    /// Native socket handle representation
    pub handle_type: &'static str,
    /// Predicate: a socket call failed
    pub call_failed: &'static str,
    /// Predicate: a handle-returning call produced the invalid handle
    pub invalid_handle: &'static str,
    /// Predicate: an asynchronous connect is still in progress
    pub connect_in_progress: &'static str,
    /// Predicate: an asynchronous connect would block
    pub connect_would_block: &'static str,
    /// Predicate: an error code means "not connected"
    pub not_connected: &'static str,
    /// Close a socket handle
    pub close: &'static str,
    /// Error code of the last failed socket call
    pub last_error: &'static str,
    /// ioctl on a socket handle
    pub ioctl: &'static str,
    /// Type of socket address lengths
    pub length_type: &'static str,
}

/// Per-family resolution strategy.
#[derive(Debug, Clone, Copy)]
pub struct FamilyStrategy {
    /// The family this strategy belongs to
    pub family: OsFamily,
    /// Capabilities the family guarantees whether or not they were probed
    pub implied_capabilities: &'static [&'static str],
    /// Capabilities the family masks even if probed
    pub suppressed_capabilities: &'static [&'static str],
    /// Socket conventions, if the family has networking
    pub sockets: Option<SocketConvention>,
}

static POSIX_STRATEGY: FamilyStrategy = FamilyStrategy {
    family: OsFamily::Posix,
    implied_capabilities: &[],
    suppressed_capabilities: &[],
    sockets: Some(SocketConvention {
        handle_type: "int",
        call_failed: "((s) < 0)",
        invalid_handle: "((s) < 0)",
        connect_in_progress: "(errno == EINPROGRESS)",
        connect_would_block: "(errno == EAGAIN)",
        not_connected: "((e) == ___FIX(___ERRNO_ERR(ENOTCONN)))",
        close: "___close_no_EINTR (s)",
        last_error: "err_code_from_errno ()",
        ioctl: "ioctl (s,cmd,argp)",
        length_type: "socklen_t",
    }),
};

static WIN32_STRATEGY: FamilyStrategy = FamilyStrategy {
    family: OsFamily::Win32,
    implied_capabilities: &[
        "has-ioctl",
        "has-clock",
        "has-createthread",
        "has-getprocesstimes",
        "has-getsystemtimeasfiletime",
        "has-queryperformancecounter",
        "has-setfiletime",
        "has-timebeginperiod",
        "has-getsysteminfo",
        "has-loadlibrary",
        "has-msgwaitformultipleobjects",
        "has-win32-sleep",
        "has-gethostname",
        "has-getpeername",
        "has-getsockname",
        "has-getaddrinfo",
        "has-gethostbyname",
        "has-gethostbyaddr",
        "has-getservbyname",
        "has-getservbyport",
        "has-getprotobyname",
        "has-getprotobynumber",
        "has-getnetbyname",
        "has-windows-h",
        "has-winsock2-h",
        "has-ws2tcpip-h",
        "has-io-h",
        "has-tchar-h",
        "has-errno-h",
    ],
    suppressed_capabilities: &["has-inet-pton"],
    sockets: Some(SocketConvention {
        handle_type: "SOCKET",
        call_failed: "((s) == SOCKET_ERROR)",
        invalid_handle: "((s) == INVALID_SOCKET)",
        connect_in_progress: "((WSAGetLastError () == WSAEALREADY) || (WSAGetLastError () == WSAEISCONN))",
        connect_would_block: "((WSAGetLastError () == WSAEWOULDBLOCK) || (WSAGetLastError () == WSAEINVAL))",
        not_connected: "((e) == ___FIX(___WIN32_ERR(WSAENOTCONN)))",
        close: "closesocket (s)",
        last_error: "err_code_from_WSAGetLastError ()",
        ioctl: "ioctlsocket (s,cmd,argp)",
        length_type: "int",
    }),
};

static GENERIC_STRATEGY: FamilyStrategy = FamilyStrategy {
    family: OsFamily::Generic,
    implied_capabilities: &[],
    suppressed_capabilities: &[],
    sockets: None,
};

/// Target platform identity, used to scope overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Linux,
    Macos,
    Ios,
    Cygwin,
    Windows,
    Emscripten,
    #[default]
    Other,
}

impl PlatformKind {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Linux => "linux",
            PlatformKind::Macos => "macos",
            PlatformKind::Ios => "ios",
            PlatformKind::Cygwin => "cygwin",
            PlatformKind::Windows => "windows",
            PlatformKind::Emscripten => "emscripten",
            PlatformKind::Other => "other",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlatformKind {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(PlatformKind::Linux),
            "macos" | "darwin" | "macosx" => Ok(PlatformKind::Macos),
            "ios" => Ok(PlatformKind::Ios),
            "cygwin" => Ok(PlatformKind::Cygwin),
            "windows" | "win32" => Ok(PlatformKind::Windows),
            "emscripten" => Ok(PlatformKind::Emscripten),
            "other" => Ok(PlatformKind::Other),
            _ => Err(PlatformParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid platform name.
#[derive(Debug, Clone)]
pub struct PlatformParseError(pub String);

impl fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid target platform '{}', valid values: linux, macos, ios, cygwin, windows, emscripten, other",
            self.0
        )
    }
}

impl std::error::Error for PlatformParseError {}

/// The platform being configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetPlatform {
    /// Platform identity
    pub kind: PlatformKind,
    /// Minimum supported macOS version, encoded like
    /// `MAC_OS_X_VERSION_MIN_REQUIRED` (10.12 is 101200)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_macos_version: Option<u32>,
}

impl TargetPlatform {
    /// Create a platform with no version constraint.
    pub fn new(kind: PlatformKind) -> Self {
        TargetPlatform {
            kind,
            min_macos_version: None,
        }
    }

    /// Set the minimum macOS version.
    pub fn with_min_macos_version(mut self, version: u32) -> Self {
        self.min_macos_version = Some(version);
        self
    }

    /// Capabilities the platform identity itself implies.
    ///
    /// A Windows target is how the compiler announces `_WIN32`, which the
    /// family classification keys on.
    pub fn implied_capabilities(&self) -> &'static [&'static str] {
        match self.kind {
            PlatformKind::Windows => &["os-win32"],
            _ => &[],
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min_macos_version {
            Some(v) => write!(f, "{} (min {})", self.kind, v),
            None => write!(f, "{}", self.kind),
        }
    }
}
