use std::{collections::HashMap, future::Future};
use warren_types::{
    minefield::{Effect, Leaderboard, Profile, Treasury},
    Key, Value,
};

/// Result of a pending mutation against a key.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

/// Backing store for engine state.
///
/// The engine only ever reads through [`crate::layer::Layer`], which overlays
/// uncommitted writes on top of an implementation of this trait.
pub trait State {
    /// Get the value for a key.
    fn get(&self, key: &Key) -> impl Future<Output = Option<Value>>;

    /// Insert a key-value pair.
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = ()>;

    /// Delete a key.
    fn delete(&mut self, key: &Key) -> impl Future<Output = ()>;

    /// Apply a batch of committed changes.
    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = ()> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await,
                    Status::Delete => self.delete(&key).await,
                }
            }
        }
    }
}

/// In-memory [`State`] backed by a [`HashMap`].
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl State for Memory {
    async fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
    }

    async fn delete(&mut self, key: &Key) {
        self.state.remove(key);
    }
}

pub(crate) async fn load_profile<S: State>(state: &S, user: u64) -> Option<Profile> {
    match state.get(&Key::Profile(user)).await {
        Some(Value::Profile(profile)) => Some(profile),
        _ => None,
    }
}

pub(crate) async fn load_effects<S: State>(state: &S, user: u64) -> Vec<Effect> {
    match state.get(&Key::Effects(user)).await {
        Some(Value::Effects(effects)) => effects,
        _ => Vec::new(),
    }
}

pub(crate) async fn load_treasury<S: State>(state: &S) -> Treasury {
    match state.get(&Key::Treasury).await {
        Some(Value::Treasury(treasury)) => treasury,
        _ => Treasury::default(),
    }
}

pub(crate) async fn load_leaderboard<S: State>(state: &S) -> Leaderboard {
    match state.get(&Key::Leaderboard).await {
        Some(Value::Leaderboard(leaderboard)) => leaderboard,
        _ => Leaderboard::default(),
    }
}
