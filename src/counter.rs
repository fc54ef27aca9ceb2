//! Request Counters
//!
//! Three increment-only counters with different synchronization disciplines.
//! They share the [`Counter`] trait so harnesses and the counting
//! factorizers can swap one for another.
//!
//! | Counter | Discipline | Exact under concurrency? |
//! |---------|------------|--------------------------|
//! | [`RacyCounter`] | none: separate read and write | No, loses updates |
//! | [`LockedCounter`] | `parking_lot::Mutex` around read-modify-write | Yes |
//! | [`AtomicCounter`] | single `fetch_add` | Yes |
//!
//! # The Lost Update
//!
//! ```text
//!   Thread A              Thread B              value
//!   read  -> 50                                   50
//!                         read  -> 50             50
//!                         write <- 51             51
//!   write <- 51                                   51   (B's increment is gone)
//! ```
//!
//! [`RacyCounter`] reproduces this without undefined behavior: the read and
//! the write are two independent `Relaxed` atomic operations, so the race is
//! purely logical. Nothing about the defect depends on compiler or hardware
//! quirks, and it shows up reliably on any multi-core machine.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;

/// Identifies a counter implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// [`RacyCounter`]
    Racy,
    /// [`LockedCounter`]
    Locked,
    /// [`AtomicCounter`]
    Atomic,
}

impl CounterKind {
    /// Every counter kind, defective first.
    pub const ALL: [CounterKind; 3] = [CounterKind::Racy, CounterKind::Locked, CounterKind::Atomic];

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Racy => "racy",
            CounterKind::Locked => "locked",
            CounterKind::Atomic => "atomic",
        }
    }

    /// Whether the counter guarantees that N increments yield exactly N.
    pub fn is_exact(&self) -> bool {
        !matches!(self, CounterKind::Racy)
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for CounterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "racy" | "unsafe" | "unsynchronized" => Ok(CounterKind::Racy),
            "locked" | "synchronized" | "mutex" => Ok(CounterKind::Locked),
            "atomic" => Ok(CounterKind::Atomic),
            other => Err(format!("unknown counter kind '{other}'")),
        }
    }
}

/// An increment-only counter shared between threads.
pub trait Counter: Send + Sync {
    /// Adds one and returns the value this call wrote.
    fn increment(&self) -> u64;

    /// Reads the current value.
    fn value(&self) -> u64;

    /// Which implementation this is.
    fn kind(&self) -> CounterKind;
}

/// A counter with no synchronization around its read-modify-write.
///
/// Concurrent increments can overwrite each other. The value read by
/// [`value`](Counter::value) while increments are in flight is unspecified.
#[derive(Debug, Default)]
pub struct RacyCounter {
    value: AtomicU64,
}

impl RacyCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments, running `between` after the read and before the write.
    ///
    /// Lets a test hold one thread inside the race window while another
    /// thread increments.
    pub fn increment_with<F: FnOnce()>(&self, between: F) -> u64 {
        let current = self.value.load(Ordering::Relaxed);
        between();
        let next = current + 1;
        self.value.store(next, Ordering::Relaxed);
        next
    }
}

impl Counter for RacyCounter {
    #[inline]
    fn increment(&self) -> u64 {
        self.increment_with(|| {})
    }

    fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    fn kind(&self) -> CounterKind {
        CounterKind::Racy
    }
}

/// A counter whose every access goes through one mutex.
#[derive(Debug, Default)]
pub struct LockedCounter {
    value: Mutex<u64>,
}

impl LockedCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Counter for LockedCounter {
    fn increment(&self) -> u64 {
        let mut value = self.value.lock();
        *value += 1;
        *value
    }

    fn value(&self) -> u64 {
        *self.value.lock()
    }

    fn kind(&self) -> CounterKind {
        CounterKind::Locked
    }
}

/// A lock-free counter built on a single atomic read-modify-write.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Counter for AtomicCounter {
    #[inline]
    fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    fn kind(&self) -> CounterKind {
        CounterKind::Atomic
    }
}

/// Creates a boxed counter of the given kind.
pub fn counter_of(kind: CounterKind) -> Box<dyn Counter> {
    match kind {
        CounterKind::Racy => Box::new(RacyCounter::new()),
        CounterKind::Locked => Box::new(LockedCounter::new()),
        CounterKind::Atomic => Box::new(AtomicCounter::new()),
    }
}
