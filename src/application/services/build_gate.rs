//! Mutual exclusion for cache builds and cache writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

/// Process-wide "a build is running" flag.
///
/// Cloning shares the flag. Entry goes through [`BuildGate::try_begin`], whose
/// guard clears the flag when dropped, so every exit path of a build releases it.
#[derive(Debug, Clone, Default)]
pub struct BuildGate {
    running: Arc<AtomicBool>,
}

impl BuildGate {
    /// Creates an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate, or returns `None` if a build already holds it.
    #[must_use]
    pub fn try_begin(&self) -> Option<BuildGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BuildGuard {
                running: Arc::clone(&self.running),
            })
    }

    /// Returns true while a guard is alive.
    #[must_use]
    pub fn is_building(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of one build.
#[derive(Debug)]
pub struct BuildGuard {
    running: Arc<AtomicBool>,
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Serializes every read-modify-write of the committed cache.
#[derive(Debug, Clone, Default)]
pub struct CacheWriteLock {
    inner: Arc<Mutex<()>>,
}

impl CacheWriteLock {
    /// Creates an unlocked lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the committed cache.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected_until_release() {
        let gate = BuildGate::new();

        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_building());
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert!(!gate.is_building());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let gate = BuildGate::new();
        let other = gate.clone();

        let _guard = gate.try_begin();
        assert!(other.is_building());
        assert!(other.try_begin().is_none());
    }

    #[tokio::test]
    async fn test_write_lock_is_exclusive() {
        let lock = CacheWriteLock::new();
        let shared = lock.clone();

        let held = lock.acquire().await;
        assert!(shared.inner.try_lock().is_err());
        drop(held);
        assert!(shared.inner.try_lock().is_ok());
    }
}
