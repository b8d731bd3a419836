//! Settlement math for cashing out a round.

use warren_types::minefield::{Effect, EffectKind, BASE_MULTIPLIER};

/// A priced cash-out: the curve payout plus any personal multiplier bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    /// Stake times the odds multiplier, floored to whole points.
    pub base: u64,
    /// Extra points on profit from reward-multiplier effects.
    pub bonus: u64,
    /// What actually gets credited.
    pub total: u64,
}

/// Folds the holder's reward-multiplier effects into one fixed-point factor.
///
/// Only effects in force at `now` count. Values below the identity are
/// treated as identity, so a malformed grant can shrink nobody's reward.
pub fn reward_multiplier_bps(effects: &[Effect], now: u64) -> u64 {
    let identity = u64::from(BASE_MULTIPLIER);
    let mut product = identity;
    for effect in effects {
        if effect.kind != EffectKind::RewardMultiplier || !effect.active_at(now) {
            continue;
        }
        let factor = u64::from(effect.value).max(identity);
        let wide = u128::from(product) * u128::from(factor) / u128::from(identity);
        product = wide.min(u128::from(u64::MAX)) as u64;
    }
    product
}

/// Prices a cash-out for `bet` at the given curve multiplier and personal
/// reward factor.
///
/// The bonus applies to profit only, rounded half up, so a round that merely
/// returns the stake pays no bonus at all.
pub fn compute(bet: u64, multiplier: f64, reward_bps: u64) -> Payout {
    let multiplier = if multiplier.is_finite() {
        multiplier.max(1.0)
    } else {
        1.0
    };
    let base = (bet as f64 * multiplier).floor() as u64;
    let profit = base.saturating_sub(bet);

    let identity = u64::from(BASE_MULTIPLIER);
    let excess = reward_bps.saturating_sub(identity);
    let wide =
        (u128::from(profit) * u128::from(excess) + u128::from(identity / 2)) / u128::from(identity);
    let bonus = wide.min(u128::from(u64::MAX)) as u64;

    Payout {
        base,
        bonus,
        total: base.saturating_add(bonus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minefield::odds;

    fn reward(value: u32, expires_at: Option<u64>) -> Effect {
        Effect {
            kind: EffectKind::RewardMultiplier,
            value,
            expires_at,
        }
    }

    #[test]
    fn test_base_payout_floors() {
        // 100 points at the first-step multiplier on a 36-cell, 8-mine field.
        let payout = compute(100, odds::multiplier(1, 8, 36), u64::from(BASE_MULTIPLIER));
        assert_eq!(payout.base, 117);
        assert_eq!(payout.bonus, 0);
        assert_eq!(payout.total, 117);
    }

    #[test]
    fn test_bonus_applies_to_profit_only() {
        // Profit 50 at 1.2x: bonus is exactly 10 extra points.
        let payout = compute(100, 1.5, 12_000);
        assert_eq!(payout.base, 150);
        assert_eq!(payout.bonus, 10);
        assert_eq!(payout.total, 160);

        // No profit, no bonus, stake comes straight back.
        let flat = compute(100, 1.0, 12_000);
        assert_eq!(flat.base, 100);
        assert_eq!(flat.bonus, 0);
    }

    #[test]
    fn test_bonus_rounds_half_up() {
        // Profit 17 at 1.2x: 3.4 rounds down, profit 25 at 1.1x: 2.5 rounds up.
        assert_eq!(compute(100, 1.17, 12_000).bonus, 3);
        assert_eq!(compute(100, 1.25, 11_000).bonus, 3);
    }

    #[test]
    fn test_degenerate_multipliers_return_stake() {
        assert_eq!(compute(100, f64::NAN, 10_000).total, 100);
        assert_eq!(compute(100, -3.0, 10_000).total, 100);
        assert_eq!(compute(100, 0.25, 10_000).total, 100);
    }

    #[test]
    fn test_reward_multiplier_fold() {
        let now = 1_000;
        assert_eq!(reward_multiplier_bps(&[], now), 10_000);

        // 1.2x and 1.5x compound to 1.8x.
        let effects = vec![reward(12_000, None), reward(15_000, Some(2_000))];
        assert_eq!(reward_multiplier_bps(&effects, now), 18_000);

        // Expired factors drop out; sub-identity factors clamp to identity.
        let effects = vec![reward(12_000, Some(1_000)), reward(2_500, None)];
        assert_eq!(reward_multiplier_bps(&effects, now), 10_000);

        // Other kinds never contribute.
        let effects = vec![Effect {
            kind: EffectKind::MineReduction,
            value: 30_000,
            expires_at: None,
        }];
        assert_eq!(reward_multiplier_bps(&effects, now), 10_000);
    }
}
