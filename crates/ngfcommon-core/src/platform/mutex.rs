//! Mutual exclusion with a uniform contract.
//!
//! Native mutexes disagree on reentrancy (`CRITICAL_SECTION` is recursive,
//! a default `pthread_mutex_t` is not). `PlatformMutex` is backed by
//! `parking_lot::RawMutex` on every target, so relocking from the owning
//! thread deadlocks everywhere and `try_lock` reports it as busy.
//!
//! | contract | here |
//! |----------|------|
//! | init     | [`PlatformMutex::new`] |
//! | lock     | [`PlatformMutex::lock`] |
//! | unlock   | [`PlatformMutex::unlock`] |
//! | destroy  | drop |

use std::fmt;

use parking_lot::lock_api::RawMutex as RawMutexApi;

/// A raw, non-reentrant lock with explicit lock/unlock calls.
pub struct PlatformMutex {
    raw: parking_lot::RawMutex,
}

impl PlatformMutex {
    /// Creates an unlocked mutex.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: <parking_lot::RawMutex as RawMutexApi>::INIT,
        }
    }

    /// Blocks until the lock is acquired.
    pub fn lock(&self) {
        self.raw.lock();
    }

    /// Acquires the lock if it is free. Returns `false` when it is held,
    /// including by the calling thread.
    #[must_use]
    pub fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }

    /// Releases the lock.
    ///
    /// # Safety
    ///
    /// The lock must be held by the current context.
    pub unsafe fn unlock(&self) {
        unsafe { self.raw.unlock() }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Locks and returns a guard that unlocks on drop.
    #[must_use]
    pub fn guard(&self) -> PlatformMutexGuard<'_> {
        self.lock();
        PlatformMutexGuard { mutex: self }
    }
}

impl Default for PlatformMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlatformMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Scoped lock on a [`PlatformMutex`].
#[must_use = "the mutex unlocks as soon as the guard is dropped"]
pub struct PlatformMutexGuard<'a> {
    mutex: &'a PlatformMutex,
}

impl Drop for PlatformMutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard only exists while `guard()` holds the lock.
        unsafe { self.mutex.unlock() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn lock_unlock_roundtrip() {
        let m = PlatformMutex::new();
        m.lock();
        assert!(m.is_locked());
        unsafe { m.unlock() };
        assert!(!m.is_locked());
    }

    #[test]
    fn relock_from_owner_is_busy() {
        let m = PlatformMutex::new();
        let _held = m.guard();
        assert!(!m.try_lock());
    }

    #[test]
    fn guard_releases_on_drop() {
        let m = PlatformMutex::new();
        {
            let _g = m.guard();
            assert!(m.is_locked());
        }
        assert!(m.try_lock());
        unsafe { m.unlock() };
    }

    #[test]
    fn serializes_concurrent_increments() {
        struct Shared {
            lock: PlatformMutex,
            // Separate load and store; only the lock keeps the count exact.
            value: AtomicUsize,
        }

        let shared = Arc::new(Shared {
            lock: PlatformMutex::new(),
            value: AtomicUsize::new(0),
        });
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let _g = shared.lock.guard();
                        let v = shared.value.load(Ordering::Relaxed);
                        std::hint::spin_loop();
                        shared.value.store(v + 1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(shared.value.load(Ordering::Relaxed), 4000);
    }
}
