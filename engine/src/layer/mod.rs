use std::collections::BTreeMap;

use warren_types::{Command, Event, Key, Value};

use crate::minefield::RoundError;
use crate::state::{load_effects, load_profile, load_treasury, State, Status};

mod handlers;

/// A pending batch of command effects over some base [`State`].
///
/// All reads go through the overlay, so a command sees every write staged
/// before it in the same batch. Nothing reaches the base state until the
/// caller applies what [`Layer::commit`] returns.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,

    /// Wall-clock milliseconds the whole batch executes at.
    now: u64,
    /// Entropy for field generation, fixed per batch.
    entropy: [u8; 32],
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, now: u64, entropy: [u8; 32]) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),

            now,
            entropy,
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn remove(&mut self, key: &Key) {
        self.pending.insert(key.clone(), Status::Delete);
    }

    fn round_error(&self, user: u64, session_id: Option<u64>, error: RoundError) -> Event {
        Event::MinefieldError {
            user,
            session_id,
            code: error.code(),
            message: error.message().to_string(),
        }
    }

    /// Executes one command for `user` and returns the events it produced.
    ///
    /// A failed action stages no writes of its own. The one side effect a
    /// failure can carry is a refund owed to a superseded round, which is a
    /// completed transition in its own right.
    pub async fn execute(&mut self, user: u64, command: &Command) -> Vec<Event> {
        match command {
            Command::Register { name } => self.handle_register(user, name).await,
            Command::Deposit { amount } => self.handle_deposit(user, *amount).await,
            Command::GrantEffect { effect } => self.handle_grant_effect(user, effect.clone()).await,
            Command::Start {
                session_id,
                rows,
                cols,
                mines,
                bet,
            } => {
                self.handle_start(user, *session_id, *rows, *cols, *mines, *bet)
                    .await
            }
            Command::Reveal { session_id, cell } => {
                self.handle_reveal(user, *session_id, *cell).await
            }
            Command::CashOut { session_id } => self.handle_cash_out(user, *session_id).await,
        }
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Option<Value> {
        match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await,
        }
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    async fn delete(&mut self, key: &Key) {
        self.pending.insert(key.clone(), Status::Delete);
    }
}
