//! Minefield round logic.
//!
//! A round is a wager against a hidden field of mines: the player keeps
//! revealing cells to grow a payout multiplier and may cash out at any point
//! after the first safe reveal. Hitting an unshielded mine forfeits the stake.
//!
//! This module owns the pure pieces of that lifecycle. Everything that touches
//! balances, effects, or persisted state lives in the command handlers.

pub mod buffs;
pub mod grid;
pub mod odds;
pub mod payout;

#[cfg(test)]
mod integration_tests;

use warren_types::minefield::{
    Session, SessionStatus, ERROR_ALREADY_REVEALED, ERROR_EFFECTS_FULL, ERROR_INSUFFICIENT_FUNDS,
    ERROR_INVALID_BET, ERROR_INVALID_CELL, ERROR_INVALID_EFFECT, ERROR_INVALID_GRID,
    ERROR_NO_REVEALS, ERROR_PROFILE_EXISTS, ERROR_PROFILE_NOT_FOUND, ERROR_SESSION_ENDED,
    ERROR_SESSION_EXISTS, ERROR_SESSION_NOT_FOUND, MINE_FLOOR_MARGIN, MIN_GRID_SIDE, MIN_MINES,
};

/// Why a minefield command was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundError {
    ProfileExists,
    ProfileNotFound,
    InsufficientFunds,
    InvalidGrid,
    InvalidBet,
    SessionExists,
    SessionNotFound,
    SessionEnded,
    AlreadyRevealed,
    InvalidCell,
    NoRevealsYet,
    InvalidEffect,
    EffectsFull,
}

impl RoundError {
    /// Stable wire code for this error.
    pub fn code(&self) -> u8 {
        match self {
            Self::ProfileExists => ERROR_PROFILE_EXISTS,
            Self::ProfileNotFound => ERROR_PROFILE_NOT_FOUND,
            Self::InsufficientFunds => ERROR_INSUFFICIENT_FUNDS,
            Self::InvalidGrid => ERROR_INVALID_GRID,
            Self::InvalidBet => ERROR_INVALID_BET,
            Self::SessionExists => ERROR_SESSION_EXISTS,
            Self::SessionNotFound => ERROR_SESSION_NOT_FOUND,
            Self::SessionEnded => ERROR_SESSION_ENDED,
            Self::AlreadyRevealed => ERROR_ALREADY_REVEALED,
            Self::InvalidCell => ERROR_INVALID_CELL,
            Self::NoRevealsYet => ERROR_NO_REVEALS,
            Self::InvalidEffect => ERROR_INVALID_EFFECT,
            Self::EffectsFull => ERROR_EFFECTS_FULL,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ProfileExists => "Profile already registered",
            Self::ProfileNotFound => "Profile not found",
            Self::InsufficientFunds => "Insufficient points for this wager",
            Self::InvalidGrid => "Grid dimensions or mine count out of range",
            Self::InvalidBet => "Bet must be greater than zero",
            Self::SessionExists => "Session id already used",
            Self::SessionNotFound => "Session not found",
            Self::SessionEnded => "Session has already ended",
            Self::AlreadyRevealed => "Cell was already revealed",
            Self::InvalidCell => "Cell is outside the grid",
            Self::NoRevealsYet => "Cash out requires at least one safe reveal",
            Self::InvalidEffect => "Effect value is not usable",
            Self::EffectsFull => "Effect set is full",
        }
    }
}

/// What a reveal did to the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The cell was safe; the multiplier track advanced.
    Safe { safe_count: u16 },
    /// The cell was a mine but a shield click absorbed it. The multiplier
    /// track does not advance.
    Absorbed { remaining_clicks: u16 },
    /// The cell was an unshielded mine. The round is over and the stake lost.
    Exploded,
}

/// Checks requested round parameters before any state is touched.
pub fn validate_round(rows: u8, cols: u8, mines: u16, bet: u64) -> Result<(), RoundError> {
    if rows < MIN_GRID_SIDE || cols < MIN_GRID_SIDE {
        return Err(RoundError::InvalidGrid);
    }
    let total_cells = u16::from(rows) * u16::from(cols);
    if mines < MIN_MINES || mines >= total_cells {
        return Err(RoundError::InvalidGrid);
    }
    if bet == 0 {
        return Err(RoundError::InvalidBet);
    }
    Ok(())
}

/// The effective mine count for a new round after buffs are applied.
///
/// Reductions come off the requested count, but the field always keeps enough
/// mines that shield clicks alone cannot clear it, and at least one cell must
/// stay safe.
pub fn final_mines(
    requested: u16,
    reduction: u64,
    extra_safe_clicks: u16,
    total_cells: u16,
) -> u16 {
    let reduced = u64::from(requested).saturating_sub(reduction);
    let floor = u64::from(extra_safe_clicks) + u64::from(MINE_FLOOR_MARGIN);
    let ceiling = u64::from(total_cells) - 1;
    reduced.max(floor).min(ceiling) as u16
}

/// Applies one reveal to an active session.
///
/// Mutates the session in place and reports what happened. Timestamps and
/// every monetary consequence are the caller's concern.
pub fn process_reveal(session: &mut Session, cell: u16) -> Result<RevealOutcome, RoundError> {
    if !session.is_active() {
        return Err(RoundError::SessionEnded);
    }
    if cell >= session.total_cells() {
        return Err(RoundError::InvalidCell);
    }
    if session.is_revealed(cell) {
        return Err(RoundError::AlreadyRevealed);
    }

    if session.is_mine(cell) {
        if session.extra_safe_clicks > 0 {
            session.extra_safe_clicks -= 1;
            session.revealed.push(cell);
            return Ok(RevealOutcome::Absorbed {
                remaining_clicks: session.extra_safe_clicks,
            });
        }
        session.revealed.push(cell);
        session.status = SessionStatus::Exploded;
        return Ok(RevealOutcome::Exploded);
    }

    session.revealed.push(cell);
    session.safe_count = session.safe_count.saturating_add(1);
    Ok(RevealOutcome::Safe {
        safe_count: session.safe_count,
    })
}
