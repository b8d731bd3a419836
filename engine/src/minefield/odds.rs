//! Multiplier curve for consecutive safe reveals.

/// Fraction of the true-odds edge passed on to the player. The remainder is
/// the house margin on every step of the curve.
pub const DAMPENING: f64 = 0.6;

/// Cumulative payout multiplier after `safe_count` safe reveals.
///
/// Each step pays dampened true odds for surviving one more pick against the
/// nominal mine count. The nominal count is used even when buffs changed the
/// planted field, so a reduced field pays as if every requested mine were
/// live. The product never drops below 1.0 and never decreases as
/// `safe_count` grows.
pub fn multiplier(safe_count: u16, nominal_mines: u16, total_cells: u16) -> f64 {
    let mut product = 1.0;
    for step in 0..safe_count {
        let remaining = total_cells.saturating_sub(step);
        let safe = remaining.saturating_sub(nominal_mines);
        if safe == 0 {
            // No nominally-safe cells left to price; the curve freezes here.
            break;
        }
        let true_odds = f64::from(remaining) / f64::from(safe);
        product *= 1.0 + DAMPENING * (true_odds - 1.0);
    }
    product
}
