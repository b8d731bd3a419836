//! Mine placement for new rounds.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Derives the generator for one round's field.
///
/// Commit entropy is mixed with the session id so two rounds started in the
/// same window still get independent layouts.
pub fn round_rng(entropy: [u8; 32], session_id: u64) -> ChaCha8Rng {
    let mut seed = entropy;
    for (slot, byte) in seed.iter_mut().zip(session_id.to_be_bytes()) {
        *slot ^= byte;
    }
    ChaCha8Rng::from_seed(seed)
}

/// Samples exactly `mines` distinct cells uniformly from `[0, total_cells)`.
///
/// Duplicates are rejected and redrawn, so every cell keeps the same chance
/// of holding a mine. The result is ascending, which is what [`Session`]
/// stores and searches.
///
/// [`Session`]: warren_types::minefield::Session
pub fn scatter_mines(rng: &mut impl Rng, total_cells: u16, mines: u16) -> Vec<u16> {
    let mut field = BTreeSet::new();
    while field.len() < usize::from(mines) {
        field.insert(rng.gen_range(0..total_cells));
    }
    field.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_mines_count_and_range() {
        let mut rng = round_rng([7u8; 32], 1);
        for (total, mines) in [(9u16, 2u16), (36, 8), (100, 35), (625, 200)] {
            let field = scatter_mines(&mut rng, total, mines);
            assert_eq!(field.len(), usize::from(mines));
            assert!(field.iter().all(|&cell| cell < total));
            assert!(field.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_scatter_mines_nearly_full_grid() {
        let mut rng = round_rng([9u8; 32], 2);
        let field = scatter_mines(&mut rng, 9, 8);
        assert_eq!(field.len(), 8);
    }

    #[test]
    fn test_round_rng_deterministic() {
        let entropy = [42u8; 32];
        let one = scatter_mines(&mut round_rng(entropy, 5), 36, 8);
        let two = scatter_mines(&mut round_rng(entropy, 5), 36, 8);
        assert_eq!(one, two);
    }

    #[test]
    fn test_round_rng_varies_by_session() {
        let entropy = [42u8; 32];
        let one = scatter_mines(&mut round_rng(entropy, 5), 625, 100);
        let two = scatter_mines(&mut round_rng(entropy, 6), 625, 100);
        assert_ne!(one, two);
    }

    #[test]
    fn test_scatter_mines_spreads_over_cells() {
        // Every cell should be hit at least once across enough rounds.
        let mut rng = round_rng([3u8; 32], 11);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            seen.extend(scatter_mines(&mut rng, 36, 8));
        }
        assert_eq!(seen.len(), 36);
    }
}
