//! Engine facade: one serialized entry point for commands plus read access.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use tokio::sync::Mutex;
use tracing::debug;
use warren_types::{
    minefield::{Effect, Leaderboard, Profile, Session, Treasury},
    Command, Event, Key, Value,
};

use crate::layer::Layer;
use crate::state::{load_effects, load_leaderboard, load_profile, load_treasury, State};

/// Owns the backing state and serializes every command against it.
///
/// The lock is held for the whole read-execute-commit span of a command, so
/// lifecycle transitions observe a total order and no balance or session is
/// ever read mid-transition. Commands never await anything but the state
/// itself while holding the lock.
pub struct Engine<S: State> {
    state: Mutex<S>,
}

impl<S: State> Engine<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Executes one command for `user` with wall-clock time and fresh
    /// entropy.
    pub async fn submit(&self, user: u64, command: Command) -> Vec<Event> {
        let mut entropy = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut entropy);
        self.submit_at(user, command, unix_ms(), entropy).await
    }

    /// Executes one command at a caller-chosen instant with caller-chosen
    /// entropy. This is the deterministic path: same state, same arguments,
    /// same outcome.
    pub async fn submit_at(
        &self,
        user: u64,
        command: Command,
        now: u64,
        entropy: [u8; 32],
    ) -> Vec<Event> {
        let mut state = self.state.lock().await;
        let mut layer = Layer::new(&*state, now, entropy);
        let events = layer.execute(user, &command).await;
        let changes = layer.commit();
        state.apply(changes).await;
        debug!(user, events = events.len(), "command executed");
        events
    }

    pub async fn profile(&self, user: u64) -> Option<Profile> {
        let state = self.state.lock().await;
        load_profile(&*state, user).await
    }

    pub async fn balance(&self, user: u64) -> Option<u64> {
        self.profile(user).await.map(|profile| profile.balance)
    }

    pub async fn session(&self, session_id: u64) -> Option<Session> {
        let state = self.state.lock().await;
        match state.get(&Key::Session(session_id)).await {
            Some(Value::Session(session)) => Some(session),
            _ => None,
        }
    }

    pub async fn effects(&self, user: u64) -> Vec<Effect> {
        let state = self.state.lock().await;
        load_effects(&*state, user).await
    }

    pub async fn treasury(&self) -> Treasury {
        let state = self.state.lock().await;
        load_treasury(&*state).await
    }

    pub async fn leaderboard(&self) -> Leaderboard {
        let state = self.state.lock().await;
        load_leaderboard(&*state).await
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
