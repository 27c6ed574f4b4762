//! Clocks used to measure latencies of single index operations.

use std::{fmt, time::Instant};

use clap::ValueEnum;

/// Source of timestamps, monotonic within a single process run.
pub trait Clock {
    /// Unit of the timestamps, shown in diagnostics.
    const UNIT: &'static str;

    /// Suffix appended to the names of output files with latencies measured by this clock.
    const FILE_SUFFIX: &'static str;

    /// Returns the current timestamp.
    fn now(&self) -> u64;

    /// Returns the latency between `before` and `after` timestamps, never negative.
    #[inline(always)] fn elapsed(before: u64, after: u64) -> u64 {
        after.saturating_sub(before)
    }
}

/// Wall clock with microsecond resolution.
pub struct WallClock {
    anchor: Instant
}

impl WallClock {
    pub fn new() -> Self { Self { anchor: Instant::now() } }
}

impl Default for WallClock {
    fn default() -> Self { Self::new() }
}

impl Clock for WallClock {
    const UNIT: &'static str = "us";
    const FILE_SUFFIX: &'static str = "";

    #[inline(always)] fn now(&self) -> u64 {
        self.anchor.elapsed().as_micros() as u64
    }
}

/// Free-running processor cycle counter.
#[derive(Default)]
pub struct CycleCounter;

#[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64", target_arch = "riscv64")))]
compile_error!("the cycle counter is not supported on this architecture");

impl Clock for CycleCounter {
    const UNIT: &'static str = "cycles";
    const FILE_SUFFIX: &'static str = ".ticks";

    #[cfg(target_arch = "x86_64")]
    #[inline(always)] fn now(&self) -> u64 {
        unsafe { core::arch::x86_64::_rdtsc() }
    }

    #[cfg(target_arch = "x86")]
    #[inline(always)] fn now(&self) -> u64 {
        unsafe { core::arch::x86::_rdtsc() }
    }

    #[cfg(target_arch = "aarch64")]
    #[inline(always)] fn now(&self) -> u64 {
        let ticks: u64;
        unsafe { core::arch::asm!("mrs {}, cntvct_el0", out(reg) ticks, options(nomem, nostack)); }
        ticks
    }

    #[cfg(target_arch = "riscv64")]
    #[inline(always)] fn now(&self) -> u64 {
        let ticks: u64;
        unsafe { core::arch::asm!("rdtime {}", out(reg) ticks, options(nomem, nostack)); }
        ticks
    }
}

/// Clock(s) used to measure latencies.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug, ValueEnum)]
pub enum ClockKind {
    /// Wall clock, latencies in microseconds
    #[default] Wall,
    /// Processor cycle counter, latencies in cycles (ticks)
    #[clap(alias = "ticks")]
    Cycles,
    /// Both clocks, each with its own warm-up
    Both,
}

impl ClockKind {
    #[inline] pub fn uses_wall_clock(self) -> bool { self != ClockKind::Cycles }
    #[inline] pub fn uses_cycle_counter(self) -> bool { self != ClockKind::Wall }
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match *self {
            ClockKind::Wall => "wall",
            ClockKind::Cycles => "cycles",
            ClockKind::Both => "both",
        })
    }
}
