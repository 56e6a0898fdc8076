//! Open battles, one per player.

use super::state::{BattleSession, Signal, ViewHandle};
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct BattleRegistry {
    sessions: DashMap<u64, BattleSession>,
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: u64) -> Option<BattleSession> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Stores (or replaces) the player's session, stamping its activity time.
    pub fn put(&self, mut session: BattleSession) {
        session.last_activity = Instant::now();
        self.sessions.insert(session.user_id, session);
    }

    pub fn remove(&self, user_id: u64) -> Option<BattleSession> {
        self.sessions.remove(&user_id).map(|(_, s)| s)
    }

    pub fn set_view(&self, user_id: u64, view: ViewHandle) -> bool {
        match self.sessions.get_mut(&user_id) {
            Some(mut session) => {
                session.view = Some(view);
                true
            }
            None => false,
        }
    }

    /// Ids of sessions idle for at least `timeout`.
    pub fn idle(&self, timeout: Duration, now: Instant) -> Vec<u64> {
        self.sessions
            .iter()
            .filter(|entry| entry.is_idle_for(timeout, now))
            .map(|entry| *entry.key())
            .collect()
    }

    /// Removes an idle session and marks it timed out.
    pub fn expire(&self, user_id: u64, timeout: Duration, now: Instant) -> Option<BattleSession> {
        let (_, mut session) = self
            .sessions
            .remove_if(&user_id, |_, s| s.is_idle_for(timeout, now))?;
        session.signal(Signal::Expired);
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
