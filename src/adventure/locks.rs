//! Per-player busy locks.
//!
//! Each player-initiated operation holds its player's lock for its whole
//! duration. A second operation arriving meanwhile is rejected at once rather
//! than queued. The guard releases on drop, so errors, panics and timeouts all
//! free the player.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Proof that the holder owns a player's lock.
#[derive(Debug)]
pub struct ActorGuard {
    pub user_id: u64,
    _guard: OwnedMutexGuard<()>,
}

#[derive(Debug, Default)]
pub struct ActorLocks {
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl ActorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lock for `user_id`, or returns `None` if it is already held.
    pub fn try_acquire(&self, user_id: u64) -> Option<ActorGuard> {
        let lock = self.locks.entry(user_id).or_default().clone();
        lock.try_lock_owned().ok().map(|guard| ActorGuard {
            user_id,
            _guard: guard,
        })
    }

    pub fn is_busy(&self, user_id: u64) -> bool {
        self.locks
            .get(&user_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Drops lock entries nobody holds. Called from the periodic sweep.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1 || lock.try_lock().is_err());
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let locks = ActorLocks::new();
        let first = locks.try_acquire(1).expect("free lock");
        assert!(locks.try_acquire(1).is_none());
        assert!(locks.is_busy(1));
        assert!(locks.try_acquire(2).is_some());
        drop(first);
        assert!(!locks.is_busy(1));
        assert!(locks.try_acquire(1).is_some());
    }

    #[test]
    fn prune_keeps_held_locks() {
        let locks = ActorLocks::new();
        let held = locks.try_acquire(1).expect("free lock");
        drop(locks.try_acquire(2));
        locks.prune();
        assert_eq!(locks.len(), 1);
        drop(held);
        locks.prune();
        assert!(locks.is_empty());
    }
}
