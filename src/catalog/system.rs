//! OS family classification, always-present basics, environment access,
//! process control, signals, and dynamic loading.

use super::{NOT_WIN32, POSIX, POSIX_OR_WIN32, WIN32};
use crate::core::facility::{FacilitySpec, OptionSpec, Stage};
use crate::core::import::DeclarationImport as Hdr;

pub(super) const FACILITIES: &[FacilitySpec] = &[
    FacilitySpec {
        id: "os-family",
        description: "OS family classification",
        stage: Stage::Classification,
        options: &[
            // waitpid is the tell-tale of a POSIX system.
            OptionSpec::new("posix")
                .requires(&["has-waitpid"])
                .exports(&["USE_POSIX"]),
            OptionSpec::new("win32")
                .requires(&["os-win32"])
                .imports(&[Hdr::WindowsH, Hdr::Winsock2H, Hdr::Ws2tcpipH, Hdr::IoH, Hdr::TcharH])
                .exports(&["USE_WIN32"]),
            OptionSpec::new("generic").exports(&["USE_GENERIC_OS"]),
        ],
    },
    FacilitySpec {
        id: "long-path",
        description: "paths longer than PATH_MAX",
        stage: Stage::Classification,
        options: &[OptionSpec::new("long_path")
            .requires(&["supports-long-path"])
            .exports(&["___SUPPORT_LONG_PATH"])],
    },
    FacilitySpec {
        id: "errno",
        description: "error reporting through errno",
        stage: Stage::Base,
        options: &[OptionSpec::new("errno").imports(&[Hdr::ErrnoH])],
    },
    FacilitySpec {
        id: "malloc",
        description: "heap allocation",
        stage: Stage::Base,
        options: &[OptionSpec::new("malloc").imports(&[Hdr::StdlibH])],
    },
    FacilitySpec {
        id: "memmove",
        description: "overlapping memory copy",
        stage: Stage::Base,
        options: &[OptionSpec::new("memmove").imports(&[Hdr::StringH])],
    },
    FacilitySpec {
        id: "snprintf",
        description: "bounded formatted output",
        stage: Stage::Base,
        options: &[OptionSpec::new("snprintf")
            .requires(&["has-snprintf"])
            .imports(&[Hdr::StdioH, Hdr::FloatH])],
    },
    FacilitySpec {
        id: "environ",
        description: "process environment block",
        stage: Stage::Base,
        options: &[
            // Windows does not propagate environ to subprocesses.
            OptionSpec::new("environ")
                .requires(&["has-environ"])
                .families(NOT_WIN32),
            OptionSpec::new("nsgetenviron")
                .requires(&["has-nsgetenviron"])
                .imports(&[Hdr::CrtExternsH])
                .exports(&["USE_environ"]),
        ],
    },
    FacilitySpec {
        id: "getenv",
        description: "read an environment variable",
        stage: Stage::Base,
        options: &[OptionSpec::new("getenv")
            .requires(&["has-getenv"])
            .imports(&[Hdr::StdlibH])],
    },
    FacilitySpec {
        id: "setenv",
        description: "set an environment variable",
        stage: Stage::Base,
        options: &[OptionSpec::new("setenv")
            .requires(&["has-setenv"])
            .imports(&[Hdr::StdlibH])],
    },
    FacilitySpec {
        id: "unsetenv",
        description: "remove an environment variable",
        stage: Stage::Base,
        options: &[OptionSpec::new("unsetenv")
            .requires(&["has-unsetenv"])
            .imports(&[Hdr::StdlibH])],
    },
    FacilitySpec {
        id: "fdset-resizing",
        description: "growable fd_set for select",
        stage: Stage::Base,
        options: &[OptionSpec::new("fdset_resizing")
            .families(POSIX)
            .exports(&["USE_FDSET_RESIZING"])],
    },
    FacilitySpec {
        id: "pipe",
        description: "anonymous pipe",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("pipe").requires(&["has-pipe"]).families(POSIX),
            OptionSpec::new("socketpair")
                .requires(&["has-socketpair"])
                .families(POSIX),
        ],
    },
    FacilitySpec {
        id: "execvp",
        description: "replace the process image",
        stage: Stage::Base,
        options: &[OptionSpec::new("execvp")
            .requires(&["has-execvp"])
            .families(POSIX)
            .imports(&[Hdr::UnistdH])],
    },
    FacilitySpec {
        id: "waitpid",
        description: "wait for a child process",
        stage: Stage::Base,
        options: &[OptionSpec::new("waitpid")
            .requires(&["has-waitpid"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::SysWaitH])],
    },
    FacilitySpec {
        id: "getpid",
        description: "current process id",
        stage: Stage::Base,
        options: &[OptionSpec::new("getpid").requires(&["has-getpid"]).families(POSIX)],
    },
    FacilitySpec {
        id: "getppid",
        description: "parent process id",
        stage: Stage::Base,
        options: &[OptionSpec::new("getppid").requires(&["has-getppid"]).families(POSIX)],
    },
    FacilitySpec {
        id: "getpwnam",
        description: "user database lookup",
        stage: Stage::Base,
        options: &[OptionSpec::new("getpwnam")
            .requires(&["has-getpwnam"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::PwdH])],
    },
    FacilitySpec {
        id: "getgrnam",
        description: "group database lookup",
        stage: Stage::Base,
        options: &[OptionSpec::new("getgrnam")
            .requires(&["has-getgrnam"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::GrpH])],
    },
    FacilitySpec {
        id: "ioctl",
        description: "device control",
        stage: Stage::Base,
        options: &[OptionSpec::new("ioctl")
            .requires(&["has-ioctl"])
            .families(POSIX_OR_WIN32)
            .imports(&[Hdr::SysIoctlH])],
    },
    FacilitySpec {
        id: "fcntl",
        description: "file descriptor control",
        stage: Stage::Base,
        options: &[OptionSpec::new("fcntl")
            .requires(&["has-fcntl"])
            .families(POSIX)
            .imports(&[Hdr::FcntlH])],
    },
    FacilitySpec {
        id: "mmap",
        description: "memory-mapped regions",
        stage: Stage::Base,
        options: &[OptionSpec::new("mmap")
            .requires(&["has-mmap"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::SysMmanH])],
    },
    FacilitySpec {
        id: "strerror",
        description: "error code to message",
        stage: Stage::Base,
        options: &[OptionSpec::new("strerror")
            .requires(&["has-strerror"])
            .families(POSIX)
            .imports(&[Hdr::StringH])],
    },
    FacilitySpec {
        id: "sysconf",
        description: "runtime system limits",
        stage: Stage::Base,
        options: &[OptionSpec::new("sysconf").requires(&["has-sysconf"]).families(POSIX)],
    },
    FacilitySpec {
        id: "sysctl",
        description: "kernel state by MIB",
        stage: Stage::Base,
        options: &[OptionSpec::new("sysctl")
            .requires(&["has-sysctl"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::SysSysctlH])],
    },
    FacilitySpec {
        id: "sysctlbyname",
        description: "kernel state by name",
        stage: Stage::Base,
        options: &[OptionSpec::new("sysctlbyname")
            .requires(&["has-sysctlbyname"])
            .families(POSIX)
            .imports(&[Hdr::SysTypesH, Hdr::SysSysctlH])],
    },
    FacilitySpec {
        id: "syslog",
        description: "system logger",
        stage: Stage::Base,
        options: &[
            // The function alone is not enough; some toolchains ship a broken header.
            OptionSpec::new("syslog")
                .requires(&["has-syslog", "has-syslog-h"])
                .families(POSIX)
                .imports(&[Hdr::SyslogH]),
        ],
    },
    FacilitySpec {
        id: "backtrace",
        description: "symbolic backtraces",
        stage: Stage::Base,
        options: &[OptionSpec::new("backtrace_symbols_fd")
            .requires(&["has-backtrace-symbols-fd"])
            .families(POSIX)
            .imports(&[Hdr::ExecinfoH])],
    },
    FacilitySpec {
        id: "sched-getcpu",
        description: "current CPU number",
        stage: Stage::Base,
        options: &[OptionSpec::new("sched_getcpu")
            .requires(&["has-sched-getcpu"])
            .families(POSIX)
            .imports(&[Hdr::SchedH])],
    },
    FacilitySpec {
        id: "win32-api",
        description: "native Win32 file, process and environment calls",
        stage: Stage::Base,
        options: &[OptionSpec::new("native")
            .families(WIN32)
            .imports(&[Hdr::WindowsH])
            .exports(&[
                "USE_CopyFile",
                "USE_CreateDirectory",
                "USE_CreateProcess",
                "USE_DeleteFile",
                "USE_FindFirstFile",
                "USE_FormatMessage",
                "USE_GetCurrentProcessId",
                "USE_GetEnvironmentStrings",
                "USE_GetEnvironmentVariable",
                "USE_GetFileAttributesEx",
                "USE_GetLastError",
                "USE_MoveFile",
                "USE_MoveFileEx",
                "USE_RemoveDirectory",
                "USE_SetCurrentDirectory",
                "USE_SetEnvironmentVariable",
                "USE_WSAGetLastError",
                "USE_GetConsoleWindow",
                "USE_GetModuleFileName",
                "USE_VirtualAlloc",
                "USE_GetSystemInfo",
            ])],
    },
    FacilitySpec {
        id: "io-pumps",
        description: "nonblocking I/O emulated with pump threads",
        stage: Stage::Base,
        options: &[OptionSpec::new("pumps").families(WIN32).exports(&["USE_PUMPS"])],
    },
    FacilitySpec {
        id: "nonblocking-file-io",
        description: "nonblocking I/O on regular files",
        stage: Stage::Base,
        options: &[OptionSpec::new("nonblocking_file_io").exports(&["USE_NONBLOCKING_FILE_IO"])],
    },
    FacilitySpec {
        id: "signal-interface",
        description: "signal handler installation",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("sigaction")
                .requires(&["has-sigaction", "has-sigemptyset", "has-sigaddset", "has-sigprocmask"])
                .families(NOT_WIN32)
                .imports(&[Hdr::SignalH])
                .exports(&["USE_sigaction", "USE_SIGNALS"]),
            OptionSpec::new("signal")
                .requires(&["has-signal"])
                .families(NOT_WIN32)
                .imports(&[Hdr::SignalH])
                .exports(&["USE_signal", "USE_SIGNALS"]),
        ],
    },
    FacilitySpec {
        id: "dynamic-loader",
        description: "dynamic library loading",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("shl_load")
                .requires(&["has-shl-load"])
                .imports(&[Hdr::DlH]),
            OptionSpec::new("LoadLibrary").requires(&["has-loadlibrary"]),
            OptionSpec::new("DosLoadModule").requires(&["has-dosloadmodule"]),
            OptionSpec::new("dxe_load")
                .requires(&["has-dxe-load"])
                .imports(&[Hdr::SysDxeH]),
            OptionSpec::new("GetDiskFragment").requires(&["has-getdiskfragment"]),
            OptionSpec::new("dlopen")
                .requires(&["has-dlopen"])
                .imports(&[Hdr::DlfcnH]),
            OptionSpec::new("NSLinkModule")
                .requires(&["has-nslinkmodule"])
                .imports(&[Hdr::MachODyldH]),
        ],
    },
    FacilitySpec {
        id: "fpu-control",
        description: "floating point control register access",
        stage: Stage::Base,
        options: &[OptionSpec::new("get_fpc_csr")
            .requires(&["has-get-fpc-csr"])
            .imports(&[Hdr::SysFpuH])],
    },
];
