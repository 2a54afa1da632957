//! Clocks, sleeping, process time, and the heartbeat timer.

use crate::core::facility::Prerequisite::{AnyOf, OneOf, Selected};
use crate::core::facility::{FacilitySpec, OptionSpec, Stage};
use crate::core::import::DeclarationImport as Hdr;

pub(super) const FACILITIES: &[FacilitySpec] = &[
    FacilitySpec {
        id: "clock-gettime",
        description: "high-resolution POSIX clocks",
        stage: Stage::Base,
        // Consumed by the realtime and monotonic clocks; some platforms
        // declare it without supporting it.
        options: &[OptionSpec::new("clock_gettime")
            .requires(&["has-clock-gettime"])
            .silent()],
    },
    FacilitySpec {
        id: "realtime-clock",
        description: "most precise wall-clock time source",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("emscripten_get_now")
                .requires(&["has-emscripten-get-now"])
                .imports(&[Hdr::EmscriptenH]),
            OptionSpec::new("clock_gettime_realtime")
                .after(&[Selected("clock-gettime")])
                .imports(&[Hdr::TimeH]),
            OptionSpec::new("getclock")
                .requires(&["has-getclock"])
                .imports(&[Hdr::SysTimersH]),
            OptionSpec::new("GetSystemTimeAsFileTime").requires(&["has-getsystemtimeasfiletime"]),
            OptionSpec::new("gettimeofday")
                .requires(&["has-gettimeofday"])
                .imports(&[Hdr::SysTimeH]),
            OptionSpec::new("ftime")
                .requires(&["has-ftime"])
                .imports(&[Hdr::SysTypesH, Hdr::SysTimebH]),
            OptionSpec::new("time")
                .requires(&["has-time"])
                .imports(&[Hdr::TimeH]),
        ],
    },
    FacilitySpec {
        id: "monotonic-clock",
        description: "most precise monotonic time source",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("mach_absolute_time")
                .requires(&["has-mach-absolute-time"])
                .imports(&[Hdr::MachMachTimeH]),
            OptionSpec::new("QueryPerformanceCounter").requires(&["has-queryperformancecounter"]),
            OptionSpec::new("clock_gettime_monotonic")
                .after(&[Selected("clock-gettime")])
                .imports(&[Hdr::TimeH]),
        ],
    },
    FacilitySpec {
        id: "sleep",
        description: "most precise sleep primitive",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("nanosleep")
                .requires(&["has-nanosleep"])
                .imports(&[Hdr::TimeH]),
            OptionSpec::new("Sleep").requires(&["has-win32-sleep"]),
            OptionSpec::new("sleep")
                .requires(&["has-sleep"])
                .imports(&[Hdr::UnistdH]),
        ],
    },
    FacilitySpec {
        id: "process-time",
        description: "most precise CPU time source",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("GetProcessTimes").requires(&["has-getprocesstimes"]),
            OptionSpec::new("getrusage")
                .requires(&["has-getrusage"])
                .imports(&[Hdr::SysTimeH, Hdr::SysResourceH, Hdr::UnistdH]),
            OptionSpec::new("times")
                .requires(&["has-times"])
                .imports(&[Hdr::SysTimesH]),
            OptionSpec::new("clock").requires(&["has-clock"]),
            OptionSpec::new("DosQuerySysInfo").requires(&["has-dosquerysysinfo"]),
        ],
    },
    FacilitySpec {
        id: "heartbeat-interface",
        description: "periodic interrupt source for the scheduler heartbeat",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("setitimer")
                .requires(&["has-setitimer"])
                .imports(&[Hdr::SysTimeH]),
            OptionSpec::new("dos_setvect").requires(&["has-dos-setvect"]),
            OptionSpec::new("DosStartTimer").requires(&["has-dosstarttimer"]),
            OptionSpec::new("VInstall").requires(&["has-vinstall"]),
            OptionSpec::new("CreateThread").requires(&["has-createthread"]),
        ],
    },
    FacilitySpec {
        id: "heartbeat-timer",
        description: "which interval timer drives the heartbeat",
        stage: Stage::Refinement,
        options: &[
            // Some platforms (DJGPP) have no ITIMER_VIRTUAL at all.
            OptionSpec::new("itimer_virtual")
                .unless(&["lacks-itimer-virtual"])
                .after(&[OneOf("heartbeat-interface", &["setitimer"])])
                .silent(),
            OptionSpec::new("itimer_real")
                .after(&[OneOf("heartbeat-interface", &["setitimer"])])
                .exports(&["USE_ITIMER_REAL"]),
        ],
    },
    FacilitySpec {
        id: "timeval",
        description: "struct timeval conversions",
        stage: Stage::Composite,
        options: &[OptionSpec::new("timeval")
            .after(&[AnyOf(&[
                OneOf("file-times", &["utimes"]),
                OneOf("select-multiplexing", &["poll", "select"]),
            ])])
            .imports(&[Hdr::SysTimeH])],
    },
    FacilitySpec {
        id: "timespec",
        description: "struct timespec conversions",
        stage: Stage::Composite,
        options: &[OptionSpec::new("timespec")
            .after(&[OneOf("poll-timeout", &["ppoll"])])
            .imports(&[Hdr::TimeH])],
    },
    FacilitySpec {
        id: "filetime",
        description: "FILETIME conversions",
        stage: Stage::Composite,
        options: &[OptionSpec::new("FILETIME").after(&[AnyOf(&[
            OneOf("file-times", &["SetFileTime"]),
            OneOf("realtime-clock", &["GetSystemTimeAsFileTime"]),
            Selected("win32-api"),
        ])])],
    },
];
