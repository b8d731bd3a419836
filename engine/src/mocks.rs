//! Deterministic fixtures for engine tests and local tooling.

use warren_types::{minefield::Effect, Command, Event};

use crate::{service::Engine, state::Memory};

/// Fixed batch instant used by every fixture-driven command.
pub const TEST_NOW: u64 = 1_700_000_000_000;

/// Reproducible entropy, distinct per tag.
pub fn entropy(tag: u64) -> [u8; 32] {
    let mut seed = [0x5au8; 32];
    for (slot, byte) in seed.iter_mut().zip(tag.to_le_bytes()) {
        *slot ^= byte;
    }
    seed
}

pub fn engine() -> Engine<Memory> {
    Engine::new(Memory::default())
}

pub async fn register(engine: &Engine<Memory>, user: u64, name: &str) -> Vec<Event> {
    engine
        .submit_at(
            user,
            Command::Register {
                name: name.to_string(),
            },
            TEST_NOW,
            entropy(0),
        )
        .await
}

pub async fn grant(engine: &Engine<Memory>, user: u64, effect: Effect) -> Vec<Event> {
    engine
        .submit_at(user, Command::GrantEffect { effect }, TEST_NOW, entropy(0))
        .await
}

pub async fn start(
    engine: &Engine<Memory>,
    user: u64,
    session_id: u64,
    rows: u8,
    cols: u8,
    mines: u16,
    bet: u64,
) -> Vec<Event> {
    engine
        .submit_at(
            user,
            Command::Start {
                session_id,
                rows,
                cols,
                mines,
                bet,
            },
            TEST_NOW,
            entropy(session_id),
        )
        .await
}

pub async fn reveal(engine: &Engine<Memory>, user: u64, session_id: u64, cell: u16) -> Vec<Event> {
    engine
        .submit_at(
            user,
            Command::Reveal { session_id, cell },
            TEST_NOW,
            entropy(0),
        )
        .await
}

pub async fn cash_out(engine: &Engine<Memory>, user: u64, session_id: u64) -> Vec<Event> {
    engine
        .submit_at(user, Command::CashOut { session_id }, TEST_NOW, entropy(0))
        .await
}

/// First unrevealed safe cell of a stored session.
pub async fn safe_cell(engine: &Engine<Memory>, session_id: u64) -> u16 {
    let session = engine.session(session_id).await.expect("session exists");
    (0..session.total_cells())
        .find(|&cell| !session.is_mine(cell) && !session.is_revealed(cell))
        .expect("grid keeps at least one safe cell")
}

/// First unrevealed mine of a stored session.
pub async fn mine_cell(engine: &Engine<Memory>, session_id: u64) -> u16 {
    let session = engine.session(session_id).await.expect("session exists");
    session
        .mines
        .iter()
        .copied()
        .find(|&cell| !session.is_revealed(cell))
        .expect("unrevealed mine exists")
}
