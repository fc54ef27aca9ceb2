//! Lazy Singleton Initialization
//!
//! A slot that is either empty or holds one shared instance, constructed on
//! first access. The interesting part is the Empty → Initialized transition
//! when several threads arrive at once.
//!
//! | Slot | Transition | Instances under a concurrent first access |
//! |------|------------|-------------------------------------------|
//! | [`RacyLazy`] | check, release, construct, publish | one or more |
//! | [`LockedLazy`] | check and construct under one mutex | exactly one |
//! | [`OnceLazy`] | `std::sync::OnceLock` | exactly one |
//!
//! # Check-Then-Act
//!
//! ```text
//!   Thread A                    Thread B
//!   slot empty? yes
//!                               slot empty? yes
//!   construct #1, publish
//!                               construct #2, publish (replaces #1)
//!   returns #1                  returns #2
//! ```
//!
//! [`RacyLazy`] keeps that window open on purpose. Each individual load and
//! store of its slot is atomic, which is exactly why the defect is easy to
//! miss: every step is "thread-safe", the sequence is not.

use arc_swap::ArcSwapOption;
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Something costly enough to be worth constructing only once.
///
/// Every construction draws a fresh process-unique [`id`](Self::id), so
/// distinct ids observed by callers prove distinct instances were built.
#[derive(Debug, PartialEq, Eq)]
pub struct ExpensiveObject {
    id: u64,
}

impl ExpensiveObject {
    /// Constructs a new instance with the next id.
    pub fn new() -> Self {
        let id = NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed);
        debug!(id, "constructed expensive object");
        Self { id }
    }

    /// Identifier assigned at construction.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Default for ExpensiveObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies a lazy slot implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LazyKind {
    /// [`RacyLazy`]
    Racy,
    /// [`LockedLazy`]
    Locked,
    /// [`OnceLazy`]
    Once,
}

impl LazyKind {
    /// Every slot kind, defective first.
    pub const ALL: [LazyKind; 3] = [LazyKind::Racy, LazyKind::Locked, LazyKind::Once];

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LazyKind::Racy => "racy",
            LazyKind::Locked => "locked",
            LazyKind::Once => "once",
        }
    }
}

impl core::fmt::Display for LazyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for LazyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "racy" | "unsafe" => Ok(LazyKind::Racy),
            "locked" | "synchronized" | "mutex" => Ok(LazyKind::Locked),
            "once" | "oncelock" => Ok(LazyKind::Once),
            other => Err(format!("unknown lazy slot kind '{other}'")),
        }
    }
}

/// A lazily initialized shared instance.
pub trait Lazy<T> {
    /// Returns the instance, constructing it with `init` if the slot is
    /// observed empty.
    fn get_or_init<F: FnOnce() -> T>(&self, init: F) -> Arc<T>;

    /// Returns the published instance, if any.
    fn get(&self) -> Option<Arc<T>>;

    /// Returns the instance, constructing it with `T::default()`.
    fn get_instance(&self) -> Arc<T>
    where
        T: Default,
    {
        self.get_or_init(T::default)
    }

    /// Returns `true` once an instance has been published.
    fn is_initialized(&self) -> bool {
        self.get().is_some()
    }
}

/// Check-then-act lazy slot with no exclusion between check and act.
#[derive(Debug)]
pub struct RacyLazy<T> {
    slot: ArcSwapOption<T>,
}

impl<T> RacyLazy<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }
}

impl<T> Default for RacyLazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lazy<T> for RacyLazy<T> {
    fn get_or_init<F: FnOnce() -> T>(&self, init: F) -> Arc<T> {
        if let Some(existing) = self.slot.load_full() {
            return existing;
        }
        // Another caller may be right here too.
        let instance = Arc::new(init());
        self.slot.store(Some(Arc::clone(&instance)));
        instance
    }

    fn get(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }
}

/// Lazy slot whose check-and-construct runs under one mutex.
///
/// Callers arriving while the instance is being built block until it is
/// published, then receive the same `Arc`.
#[derive(Debug)]
pub struct LockedLazy<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> LockedLazy<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> Default for LockedLazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lazy<T> for LockedLazy<T> {
    fn get_or_init<F: FnOnce() -> T>(&self, init: F) -> Arc<T> {
        let mut slot = self.slot.lock();
        Arc::clone(slot.get_or_insert_with(|| Arc::new(init())))
    }

    fn get(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }
}

/// Lazy slot backed by the standard library's initialize-once cell.
#[derive(Debug)]
pub struct OnceLazy<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> OnceLazy<T> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }
}

impl<T> Default for OnceLazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lazy<T> for OnceLazy<T> {
    fn get_or_init<F: FnOnce() -> T>(&self, init: F) -> Arc<T> {
        Arc::clone(self.cell.get_or_init(|| Arc::new(init())))
    }

    fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn exercise<L: Lazy<ExpensiveObject>>(lazy: &L) {
        assert!(!lazy.is_initialized());
        assert!(lazy.get().is_none());

        let first = lazy.get_instance();
        let second = lazy.get_instance();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(lazy.is_initialized());
        assert_eq!(lazy.get().map(|o| o.id()), Some(first.id()));
    }

    #[test]
    fn test_sequential_access_returns_one_instance() {
        exercise(&RacyLazy::new());
        exercise(&LockedLazy::new());
        exercise(&OnceLazy::new());
    }

    #[test]
    fn test_init_not_called_after_publish() {
        let calls = AtomicUsize::new(0);
        let lazy = LockedLazy::new();
        for _ in 0..10 {
            lazy.get_or_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                7u32
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lazy.get().as_deref(), Some(&7));
    }

    #[test]
    fn test_object_ids_are_unique() {
        let a = ExpensiveObject::new();
        let b = ExpensiveObject::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("once".parse::<LazyKind>(), Ok(LazyKind::Once));
        assert_eq!("unsafe".parse::<LazyKind>(), Ok(LazyKind::Racy));
        assert!("double-checked".parse::<LazyKind>().is_err());
    }
}
