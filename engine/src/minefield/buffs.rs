//! Effect resolution for round lifecycle transitions.
//!
//! Effects come in two shapes. One-shot grants have no expiry and are spent
//! by the first action that uses them. Timed effects carry an expiry and
//! apply to every action until that instant, without ever being consumed.

use warren_types::minefield::{Effect, EffectKind};

/// Sum of the values of all effects of `kind` in force at `now`.
pub fn total_value(effects: &[Effect], kind: EffectKind, now: u64) -> u64 {
    effects
        .iter()
        .filter(|effect| effect.kind == kind && effect.active_at(now))
        .map(|effect| u64::from(effect.value))
        .sum()
}

/// Spends every one-shot effect of the given kinds and prunes anything that
/// has expired. Returns the set to persist.
///
/// Call this once per triggering action, in the same commit as the state
/// transition the effects applied to.
pub fn consume_one_shot(effects: Vec<Effect>, kinds: &[EffectKind], now: u64) -> Vec<Effect> {
    effects
        .into_iter()
        .filter(|effect| {
            effect.active_at(now) && !(effect.one_shot() && kinds.contains(&effect.kind))
        })
        .collect()
}
