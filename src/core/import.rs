//! Declaration imports (system headers) required by selected primitives.
//!
//! The variant order is the canonical inclusion order: some platforms need
//! `sys/types.h` before `sys/stat.h`, `windows.h` before `winsock2.h`, and so
//! on. `ImportSet` is ordered by it, so rendering never depends on the order
//! in which facilities were visited.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::capability::CapabilitySet;

/// One external declaration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclarationImport {
    ErrnoH,
    UnistdH,
    PwdH,
    DirentH,
    DlfcnH,
    DlH,
    SysDxeH,
    MachODyldH,
    SysTypesH,
    SysTimeH,
    SysTimesH,
    SysTimebH,
    SysTimersH,
    TimeH,
    MachMachTimeH,
    SysResourceH,
    SysStatH,
    SysWaitH,
    SysMmanH,
    SysSyscallH,
    LinuxFsH,
    SyslogH,
    ExecinfoH,
    SignalH,
    NetdbH,
    GrpH,
    EmscriptenH,
    WindowsH,
    Winsock2H,
    Ws2tcpipH,
    IoH,
    TcharH,
    FloatH,
    NetinetInH,
    ArpaInetH,
    SysSysctlH,
    TermiosH,
    PtyH,
    StroptsH,
    LibutilH,
    UtilH,
    SysFpuH,
    FcntlH,
    SysIoctlH,
    SysSocketH,
    StdioH,
    StdintH,
    StdlibH,
    StringH,
    CrtExternsH,
    PollH,
    SchedH,
}

impl DeclarationImport {
    /// All imports in canonical order.
    pub const ALL: &'static [DeclarationImport] = &[
        DeclarationImport::ErrnoH,
        DeclarationImport::UnistdH,
        DeclarationImport::PwdH,
        DeclarationImport::DirentH,
        DeclarationImport::DlfcnH,
        DeclarationImport::DlH,
        DeclarationImport::SysDxeH,
        DeclarationImport::MachODyldH,
        DeclarationImport::SysTypesH,
        DeclarationImport::SysTimeH,
        DeclarationImport::SysTimesH,
        DeclarationImport::SysTimebH,
        DeclarationImport::SysTimersH,
        DeclarationImport::TimeH,
        DeclarationImport::MachMachTimeH,
        DeclarationImport::SysResourceH,
        DeclarationImport::SysStatH,
        DeclarationImport::SysWaitH,
        DeclarationImport::SysMmanH,
        DeclarationImport::SysSyscallH,
        DeclarationImport::LinuxFsH,
        DeclarationImport::SyslogH,
        DeclarationImport::ExecinfoH,
        DeclarationImport::SignalH,
        DeclarationImport::NetdbH,
        DeclarationImport::GrpH,
        DeclarationImport::EmscriptenH,
        DeclarationImport::WindowsH,
        DeclarationImport::Winsock2H,
        DeclarationImport::Ws2tcpipH,
        DeclarationImport::IoH,
        DeclarationImport::TcharH,
        DeclarationImport::FloatH,
        DeclarationImport::NetinetInH,
        DeclarationImport::ArpaInetH,
        DeclarationImport::SysSysctlH,
        DeclarationImport::TermiosH,
        DeclarationImport::PtyH,
        DeclarationImport::StroptsH,
        DeclarationImport::LibutilH,
        DeclarationImport::UtilH,
        DeclarationImport::SysFpuH,
        DeclarationImport::FcntlH,
        DeclarationImport::SysIoctlH,
        DeclarationImport::SysSocketH,
        DeclarationImport::StdioH,
        DeclarationImport::StdintH,
        DeclarationImport::StdlibH,
        DeclarationImport::StringH,
        DeclarationImport::CrtExternsH,
        DeclarationImport::PollH,
        DeclarationImport::SchedH,
    ];

    /// The header path as written inside an include directive.
    pub fn header(&self) -> &'static str {
        match self {
            DeclarationImport::ErrnoH => "errno.h",
            DeclarationImport::UnistdH => "unistd.h",
            DeclarationImport::PwdH => "pwd.h",
            DeclarationImport::DirentH => "dirent.h",
            DeclarationImport::DlfcnH => "dlfcn.h",
            DeclarationImport::DlH => "dl.h",
            DeclarationImport::SysDxeH => "sys/dxe.h",
            DeclarationImport::MachODyldH => "mach-o/dyld.h",
            DeclarationImport::SysTypesH => "sys/types.h",
            DeclarationImport::SysTimeH => "sys/time.h",
            DeclarationImport::SysTimesH => "sys/times.h",
            DeclarationImport::SysTimebH => "sys/timeb.h",
            DeclarationImport::SysTimersH => "sys/timers.h",
            DeclarationImport::TimeH => "time.h",
            DeclarationImport::MachMachTimeH => "mach/mach_time.h",
            DeclarationImport::SysResourceH => "sys/resource.h",
            DeclarationImport::SysStatH => "sys/stat.h",
            DeclarationImport::SysWaitH => "sys/wait.h",
            DeclarationImport::SysMmanH => "sys/mman.h",
            DeclarationImport::SysSyscallH => "sys/syscall.h",
            DeclarationImport::LinuxFsH => "linux/fs.h",
            DeclarationImport::SyslogH => "syslog.h",
            DeclarationImport::ExecinfoH => "execinfo.h",
            DeclarationImport::SignalH => "signal.h",
            DeclarationImport::NetdbH => "netdb.h",
            DeclarationImport::GrpH => "grp.h",
            DeclarationImport::EmscriptenH => "emscripten.h",
            DeclarationImport::WindowsH => "windows.h",
            DeclarationImport::Winsock2H => "winsock2.h",
            DeclarationImport::Ws2tcpipH => "ws2tcpip.h",
            DeclarationImport::IoH => "io.h",
            DeclarationImport::TcharH => "tchar.h",
            DeclarationImport::FloatH => "float.h",
            DeclarationImport::NetinetInH => "netinet/in.h",
            DeclarationImport::ArpaInetH => "arpa/inet.h",
            DeclarationImport::SysSysctlH => "sys/sysctl.h",
            DeclarationImport::TermiosH => "termios.h",
            DeclarationImport::PtyH => "pty.h",
            DeclarationImport::StroptsH => "stropts.h",
            DeclarationImport::LibutilH => "libutil.h",
            DeclarationImport::UtilH => "util.h",
            DeclarationImport::SysFpuH => "sys/fpu.h",
            DeclarationImport::FcntlH => "fcntl.h",
            DeclarationImport::SysIoctlH => "sys/ioctl.h",
            DeclarationImport::SysSocketH => "sys/socket.h",
            DeclarationImport::StdioH => "stdio.h",
            DeclarationImport::StdintH => "stdint.h",
            DeclarationImport::StdlibH => "stdlib.h",
            DeclarationImport::StringH => "string.h",
            DeclarationImport::CrtExternsH => "crt_externs.h",
            DeclarationImport::PollH => "poll.h",
            DeclarationImport::SchedH => "sched.h",
        }
    }

    /// The capability flag reporting that this header exists, derived from
    /// the header path (`sys/time.h` -> `has-sys-time-h`).
    ///
    /// `sched.h` has no probe and is treated as always present.
    pub fn probe_flag(&self) -> Option<String> {
        if matches!(self, DeclarationImport::SchedH) {
            return None;
        }
        let slug: String = self
            .header()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        Some(format!("has-{}", slug.to_ascii_lowercase()))
    }

    /// Whether the header is a local (quoted) include rather than a system one.
    pub fn is_local(&self) -> bool {
        matches!(self, DeclarationImport::EmscriptenH)
    }

    /// The include directive for this header.
    pub fn include_directive(&self) -> String {
        if self.is_local() {
            format!("#include \"{}\"", self.header())
        } else {
            format!("#include <{}>", self.header())
        }
    }
}

impl fmt::Display for DeclarationImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl Serialize for DeclarationImport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.header())
    }
}

/// A duplicate-free, canonically ordered set of declaration imports.
///
/// Insertion is idempotent and commutative: the same import requested by
/// several selections appears once, and the final set does not depend on
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportSet {
    imports: BTreeSet<DeclarationImport>,
}

impl ImportSet {
    /// Create an empty set.
    pub fn new() -> Self {
        ImportSet::default()
    }

    /// Request an import. Returns false if it was already present.
    pub fn insert(&mut self, import: DeclarationImport) -> bool {
        self.imports.insert(import)
    }

    /// Request several imports.
    pub fn extend(&mut self, imports: impl IntoIterator<Item = DeclarationImport>) {
        self.imports.extend(imports);
    }

    /// Union with another set.
    pub fn union(&self, other: &ImportSet) -> ImportSet {
        ImportSet {
            imports: self.imports.union(&other.imports).copied().collect(),
        }
    }

    /// Check whether an import is present.
    pub fn contains(&self, import: DeclarationImport) -> bool {
        self.imports.contains(&import)
    }

    /// Imports whose header the probe reports as present.
    ///
    /// Probes that carry no header flags at all are assumed to have every
    /// header, since there is nothing to filter on.
    pub fn available(&self, capabilities: &CapabilitySet) -> ImportSet {
        if !capabilities.reports_headers() {
            return self.clone();
        }

        ImportSet {
            imports: self
                .imports
                .iter()
                .copied()
                .filter(|import| match import.probe_flag() {
                    Some(flag) => capabilities.has(&flag),
                    None => true,
                })
                .collect(),
        }
    }

    /// Imports present here but not in `other`.
    pub fn difference(&self, other: &ImportSet) -> Vec<DeclarationImport> {
        self.imports.difference(&other.imports).copied().collect()
    }

    /// Iterate in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = DeclarationImport> + '_ {
        self.imports.iter().copied()
    }

    /// Number of imports.
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

impl FromIterator<DeclarationImport> for ImportSet {
    fn from_iter<T: IntoIterator<Item = DeclarationImport>>(iter: T) -> Self {
        ImportSet {
            imports: iter.into_iter().collect(),
        }
    }
}
