//! Integration tests for the round lifecycle.
//!
//! These drive the full engine stack: commands enter through the service,
//! execute against a layered batch, and commit to in-memory state.

#[cfg(test)]
mod tests {
    use crate::mocks::{
        cash_out, engine, entropy, grant, mine_cell, register, reveal, safe_cell, start, TEST_NOW,
    };
    use crate::service::Engine;
    use crate::state::Memory;
    use warren_types::minefield::{
        Effect, EffectKind, SessionStatus, ERROR_ALREADY_REVEALED, ERROR_INSUFFICIENT_FUNDS,
        ERROR_INVALID_BET, ERROR_INVALID_CELL, ERROR_INVALID_EFFECT, ERROR_INVALID_GRID,
        ERROR_NO_REVEALS, ERROR_PROFILE_EXISTS, ERROR_PROFILE_NOT_FOUND, ERROR_SESSION_ENDED,
        ERROR_SESSION_EXISTS, ERROR_SESSION_NOT_FOUND, STARTING_POINTS,
    };
    use warren_types::{Command, Event};

    fn error_code(events: &[Event]) -> u8 {
        match events.last() {
            Some(Event::MinefieldError { code, .. }) => *code,
            other => panic!("Expected MinefieldError, got {other:?}"),
        }
    }

    fn one_shot(kind: EffectKind, value: u32) -> Effect {
        Effect {
            kind,
            value,
            expires_at: None,
        }
    }

    /// Safe reveal, cash out, and every balance and aggregate that follows.
    #[tokio::test]
    async fn test_round_cash_out_flow() {
        let engine = engine();
        register(&engine, 1, "Alice").await;

        let events = start(&engine, 1, 10, 6, 6, 8, 100).await;
        match &events[0] {
            Event::RoundStarted {
                mines_count,
                balance,
                ..
            } => {
                assert_eq!(*mines_count, 8);
                assert_eq!(*balance, STARTING_POINTS - 100);
            }
            other => panic!("Expected RoundStarted, got {other:?}"),
        }

        // First safe pick on 36 cells and 8 mines quotes dampened true odds:
        // floor(100 * (1 + 0.6 * (36/28 - 1))) = 117.
        let cell = safe_cell(&engine, 10).await;
        let events = reveal(&engine, 1, 10, cell).await;
        match &events[0] {
            Event::CellRevealed {
                safe_count,
                potential_reward,
                extra_safe_clicks,
                ..
            } => {
                assert_eq!(*safe_count, 1);
                assert_eq!(*potential_reward, 117);
                assert_eq!(*extra_safe_clicks, 0);
            }
            other => panic!("Expected CellRevealed, got {other:?}"),
        }

        let events = cash_out(&engine, 1, 10).await;
        match &events[0] {
            Event::RoundCashedOut {
                reward, balance, ..
            } => {
                assert_eq!(*reward, 117);
                assert_eq!(*balance, STARTING_POINTS + 17);
            }
            other => panic!("Expected RoundCashedOut, got {other:?}"),
        }

        let profile = engine.profile(1).await.unwrap();
        assert_eq!(profile.balance, 1_017);
        assert_eq!(profile.active_session, None);
        assert_eq!(profile.minefield_plays, 1);
        assert_eq!(profile.minefield_wins, 1);
        assert_eq!(profile.gambling_won, 17);
        assert_eq!(profile.gambling_lost, 0);

        let session = engine.session(10).await.unwrap();
        assert_eq!(session.status, SessionStatus::CashedOut);
        assert_eq!(session.ended_at, Some(TEST_NOW));

        let treasury = engine.treasury().await;
        assert!(treasury.conserved());
        assert_eq!(treasury.total_staked, 100);
        assert_eq!(treasury.total_settled, 100);
        assert_eq!(treasury.total_paid, 117);
        assert_eq!(treasury.net_pnl, -17);
        assert_eq!(treasury.open_stakes, 0);
    }

    /// An unshielded mine ends the round and the stake stays with the house.
    #[tokio::test]
    async fn test_explosion_forfeits_stake() {
        let engine = engine();
        register(&engine, 1, "Bob").await;
        start(&engine, 1, 20, 6, 6, 8, 250).await;

        let cell = mine_cell(&engine, 20).await;
        let events = reveal(&engine, 1, 20, cell).await;
        match &events[0] {
            Event::RoundExploded {
                cell: hit, mines, ..
            } => {
                assert_eq!(*hit, cell);
                assert_eq!(mines.len(), 8);
                assert!(mines.contains(&cell));
            }
            other => panic!("Expected RoundExploded, got {other:?}"),
        }

        let profile = engine.profile(1).await.unwrap();
        assert_eq!(profile.balance, STARTING_POINTS - 250);
        assert_eq!(profile.active_session, None);
        assert_eq!(profile.minefield_wins, 0);
        assert_eq!(profile.gambling_lost, 250);

        let session = engine.session(20).await.unwrap();
        assert_eq!(session.status, SessionStatus::Exploded);
        assert_eq!(session.ended_at, Some(TEST_NOW));

        // Terminal rounds accept neither reveals nor cash outs.
        let safe = safe_cell(&engine, 20).await;
        assert_eq!(error_code(&reveal(&engine, 1, 20, safe).await), ERROR_SESSION_ENDED);
        assert_eq!(error_code(&cash_out(&engine, 1, 20).await), ERROR_SESSION_ENDED);

        let treasury = engine.treasury().await;
        assert!(treasury.conserved());
        assert_eq!(treasury.net_pnl, 250);
        assert_eq!(treasury.rounds_settled, 1);
    }

    /// A shield click eats a mine hit without crediting the multiplier track.
    #[tokio::test]
    async fn test_shield_click_absorbs_mine() {
        let engine = engine();
        register(&engine, 1, "Carol").await;
        grant(&engine, 1, one_shot(EffectKind::ExtraSafeClick, 1)).await;

        let events = start(&engine, 1, 30, 6, 6, 8, 100).await;
        match &events[0] {
            Event::RoundStarted {
                extra_safe_clicks,
                mines_count,
                ..
            } => {
                assert_eq!(*extra_safe_clicks, 1);
                assert_eq!(*mines_count, 8);
            }
            other => panic!("Expected RoundStarted, got {other:?}"),
        }
        // The grant was spent at round start.
        assert!(engine.effects(1).await.is_empty());

        let cell = mine_cell(&engine, 30).await;
        let events = reveal(&engine, 1, 30, cell).await;
        match &events[0] {
            Event::CellRevealed {
                safe_count,
                extra_safe_clicks,
                potential_reward,
                ..
            } => {
                assert_eq!(*safe_count, 0);
                assert_eq!(*extra_safe_clicks, 0);
                // No credit for an absorbed hit: still the stake-only quote.
                assert_eq!(*potential_reward, 100);
            }
            other => panic!("Expected CellRevealed, got {other:?}"),
        }

        let session = engine.session(30).await.unwrap();
        assert!(session.is_active());

        // The absorbed cell is spent for good.
        assert_eq!(
            error_code(&reveal(&engine, 1, 30, cell).await),
            ERROR_ALREADY_REVEALED
        );

        // With the shield gone the next mine ends the round.
        let cell = mine_cell(&engine, 30).await;
        let events = reveal(&engine, 1, 30, cell).await;
        assert!(matches!(events[0], Event::RoundExploded { .. }));
    }

    /// Starting fresh while a round is live refunds the old stake in full.
    #[tokio::test]
    async fn test_new_round_supersedes_active_one() {
        let engine = engine();
        register(&engine, 1, "Dave").await;
        start(&engine, 1, 1, 6, 6, 8, 100).await;

        let events = start(&engine, 1, 2, 5, 5, 4, 200).await;
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::RoundForfeited {
                session_id,
                refund,
                balance,
                ..
            } => {
                assert_eq!(*session_id, 1);
                assert_eq!(*refund, 100);
                assert_eq!(*balance, STARTING_POINTS);
            }
            other => panic!("Expected RoundForfeited, got {other:?}"),
        }
        match &events[1] {
            Event::RoundStarted {
                session_id,
                balance,
                ..
            } => {
                assert_eq!(*session_id, 2);
                assert_eq!(*balance, STARTING_POINTS - 200);
            }
            other => panic!("Expected RoundStarted, got {other:?}"),
        }

        let old = engine.session(1).await.unwrap();
        assert_eq!(old.status, SessionStatus::CashedOut);
        assert_eq!(engine.profile(1).await.unwrap().active_session, Some(2));

        let treasury = engine.treasury().await;
        assert!(treasury.conserved());
        assert_eq!(treasury.total_refunded, 100);
        assert_eq!(treasury.open_stakes, 200);
    }

    /// The supersede refund stands even when the new wager then bounces.
    #[tokio::test]
    async fn test_insufficient_funds_after_supersede_keeps_refund() {
        let engine = engine();
        register(&engine, 1, "Erin").await;
        start(&engine, 1, 1, 6, 6, 8, 600).await;
        assert_eq!(engine.balance(1).await, Some(400));

        let events = start(&engine, 1, 2, 6, 6, 8, 2_000).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::RoundForfeited { refund: 600, .. }));
        assert_eq!(error_code(&events), ERROR_INSUFFICIENT_FUNDS);

        assert_eq!(engine.balance(1).await, Some(STARTING_POINTS));
        let profile = engine.profile(1).await.unwrap();
        assert_eq!(profile.active_session, None);
        assert_eq!(
            engine.session(1).await.unwrap().status,
            SessionStatus::CashedOut
        );
        assert!(engine.session(2).await.is_none());

        let treasury = engine.treasury().await;
        assert!(treasury.conserved());
        assert_eq!(treasury.total_staked, 600);
        assert_eq!(treasury.total_refunded, 600);
        assert_eq!(treasury.open_stakes, 0);
    }

    /// Bad parameters are refused before any state is touched.
    #[tokio::test]
    async fn test_start_validation() {
        let engine = engine();

        let events = start(&engine, 1, 1, 6, 6, 8, 100).await;
        assert_eq!(error_code(&events), ERROR_PROFILE_NOT_FOUND);

        register(&engine, 1, "Frank").await;
        assert_eq!(error_code(&start(&engine, 1, 1, 2, 5, 2, 100).await), ERROR_INVALID_GRID);
        assert_eq!(error_code(&start(&engine, 1, 1, 6, 6, 1, 100).await), ERROR_INVALID_GRID);
        assert_eq!(error_code(&start(&engine, 1, 1, 6, 6, 36, 100).await), ERROR_INVALID_GRID);
        assert_eq!(error_code(&start(&engine, 1, 1, 6, 6, 8, 0).await), ERROR_INVALID_BET);
        assert_eq!(
            error_code(&start(&engine, 1, 1, 6, 6, 8, 5_000).await),
            ERROR_INSUFFICIENT_FUNDS
        );

        // Nothing above moved points or created sessions.
        assert_eq!(engine.balance(1).await, Some(STARTING_POINTS));
        assert!(engine.session(1).await.is_none());
        assert_eq!(engine.treasury().await.total_staked, 0);

        // Session ids are single-use, and a rejected id ends no live round.
        start(&engine, 1, 1, 6, 6, 8, 100).await;
        assert_eq!(error_code(&start(&engine, 1, 1, 5, 5, 4, 50).await), ERROR_SESSION_EXISTS);
        assert!(engine.session(1).await.unwrap().is_active());
    }

    /// Mine reduction reshapes the planted field but never the priced odds.
    #[tokio::test]
    async fn test_mine_reduction_keeps_nominal_odds() {
        let engine = engine();
        register(&engine, 1, "Grace").await;
        grant(&engine, 1, one_shot(EffectKind::MineReduction, 3)).await;
        grant(&engine, 1, one_shot(EffectKind::ExtraSafeClick, 1)).await;

        // Requested 10 mines: reduced to 7, floor(1 + 2) does not bind.
        let events = start(&engine, 1, 40, 6, 6, 10, 100).await;
        match &events[0] {
            Event::RoundStarted {
                mines_count,
                extra_safe_clicks,
                mine_reduction,
                ..
            } => {
                assert_eq!(*mines_count, 7);
                assert_eq!(*extra_safe_clicks, 1);
                assert_eq!(*mine_reduction, 3);
            }
            other => panic!("Expected RoundStarted, got {other:?}"),
        }

        let session = engine.session(40).await.unwrap();
        assert_eq!(session.mines.len(), 7);
        assert_eq!(session.nominal_mines, 10);
        assert!(engine.effects(1).await.is_empty());

        // The quote prices all 10 requested mines even though 7 are planted:
        // floor(100 * (1 + 0.6 * (36/26 - 1))) = 123.
        let cell = safe_cell(&engine, 40).await;
        let events = reveal(&engine, 1, 40, cell).await;
        match &events[0] {
            Event::CellRevealed {
                potential_reward, ..
            } => assert_eq!(*potential_reward, 123),
            other => panic!("Expected CellRevealed, got {other:?}"),
        }
    }

    /// Stacked absorption grants cannot make a field risk-free.
    #[tokio::test]
    async fn test_mine_floor_binds_under_heavy_buffs() {
        let engine = engine();
        register(&engine, 1, "Heidi").await;
        grant(&engine, 1, one_shot(EffectKind::MineReduction, 50)).await;
        grant(&engine, 1, one_shot(EffectKind::ExtraSafeClick, 6)).await;

        let events = start(&engine, 1, 50, 6, 6, 10, 100).await;
        match &events[0] {
            Event::RoundStarted {
                mines_count,
                extra_safe_clicks,
                ..
            } => {
                // Reduction would leave zero; the floor plants clicks + 2.
                assert_eq!(*mines_count, 8);
                assert_eq!(*extra_safe_clicks, 6);
            }
            other => panic!("Expected RoundStarted, got {other:?}"),
        }
    }

    /// Reward multipliers pay on profit at cash out and are spent there.
    #[tokio::test]
    async fn test_reward_multiplier_bonus() {
        let engine = engine();
        register(&engine, 1, "Ivan").await;
        grant(&engine, 1, one_shot(EffectKind::RewardMultiplier, 12_000)).await;

        start(&engine, 1, 60, 6, 6, 8, 100).await;
        // Multiplier grants survive round start untouched.
        assert_eq!(engine.effects(1).await.len(), 1);

        // Quote includes the bonus: base 117, profit 17 at 1.2x adds 3.
        let cell = safe_cell(&engine, 60).await;
        let events = reveal(&engine, 1, 60, cell).await;
        match &events[0] {
            Event::CellRevealed {
                potential_reward, ..
            } => assert_eq!(*potential_reward, 120),
            other => panic!("Expected CellRevealed, got {other:?}"),
        }

        let events = cash_out(&engine, 1, 60).await;
        match &events[0] {
            Event::RoundCashedOut { reward, .. } => assert_eq!(*reward, 120),
            other => panic!("Expected RoundCashedOut, got {other:?}"),
        }
        assert!(engine.effects(1).await.is_empty());
        assert_eq!(engine.profile(1).await.unwrap().gambling_won, 20);

        // The next round pays plain curve odds again.
        start(&engine, 1, 61, 6, 6, 8, 100).await;
        let cell = safe_cell(&engine, 61).await;
        reveal(&engine, 1, 61, cell).await;
        let events = cash_out(&engine, 1, 61).await;
        match &events[0] {
            Event::RoundCashedOut { reward, .. } => assert_eq!(*reward, 117),
            other => panic!("Expected RoundCashedOut, got {other:?}"),
        }
    }

    /// Timed effects apply to every action in their window and then lapse.
    #[tokio::test]
    async fn test_timed_effects_persist_until_expiry() {
        let engine = engine();
        register(&engine, 1, "Judy").await;
        grant(
            &engine,
            1,
            Effect {
                kind: EffectKind::RewardMultiplier,
                value: 15_000,
                expires_at: Some(TEST_NOW + 1_000),
            },
        )
        .await;

        start(&engine, 1, 70, 6, 6, 8, 100).await;
        let cell = safe_cell(&engine, 70).await;
        reveal(&engine, 1, 70, cell).await;
        let events = cash_out(&engine, 1, 70).await;
        match &events[0] {
            // Base 117, profit 17 at 1.5x adds round(8.5) = 9.
            Event::RoundCashedOut { reward, .. } => assert_eq!(*reward, 126),
            other => panic!("Expected RoundCashedOut, got {other:?}"),
        }
        // Timed grants are not consumed by settlement.
        assert_eq!(engine.effects(1).await.len(), 1);

        // Past the window the effect contributes nothing and gets pruned.
        let later = TEST_NOW + 2_000;
        engine
            .submit_at(
                1,
                Command::Start {
                    session_id: 71,
                    rows: 6,
                    cols: 6,
                    mines: 8,
                    bet: 100,
                },
                later,
                entropy(71),
            )
            .await;
        let cell = safe_cell(&engine, 71).await;
        engine
            .submit_at(1, Command::Reveal { session_id: 71, cell }, later, entropy(0))
            .await;
        let events = engine
            .submit_at(1, Command::CashOut { session_id: 71 }, later, entropy(0))
            .await;
        match &events[0] {
            Event::RoundCashedOut { reward, .. } => assert_eq!(*reward, 117),
            other => panic!("Expected RoundCashedOut, got {other:?}"),
        }
        assert!(engine.effects(1).await.is_empty());
    }

    /// Cashing out an untouched round is refused.
    #[tokio::test]
    async fn test_cash_out_requires_safe_reveal() {
        let engine = engine();
        register(&engine, 1, "Kim").await;
        start(&engine, 1, 80, 6, 6, 8, 100).await;

        assert_eq!(error_code(&cash_out(&engine, 1, 80).await), ERROR_NO_REVEALS);

        // An absorbed hit alone still leaves nothing to settle.
        grant(&engine, 1, one_shot(EffectKind::ExtraSafeClick, 1)).await;
        start(&engine, 1, 81, 6, 6, 8, 100).await;
        let cell = mine_cell(&engine, 81).await;
        reveal(&engine, 1, 81, cell).await;
        assert_eq!(error_code(&cash_out(&engine, 1, 81).await), ERROR_NO_REVEALS);

        // One safe pick unlocks settlement.
        let cell = safe_cell(&engine, 81).await;
        reveal(&engine, 1, 81, cell).await;
        let events = cash_out(&engine, 1, 81).await;
        assert!(matches!(events[0], Event::RoundCashedOut { .. }));
    }

    /// Session lookups hide rounds the caller does not own.
    #[tokio::test]
    async fn test_reveal_error_paths() {
        let engine = engine();
        register(&engine, 1, "Laura").await;
        register(&engine, 2, "Mike").await;
        start(&engine, 1, 90, 6, 6, 8, 100).await;

        assert_eq!(
            error_code(&reveal(&engine, 1, 999, 0).await),
            ERROR_SESSION_NOT_FOUND
        );
        assert_eq!(
            error_code(&reveal(&engine, 2, 90, 0).await),
            ERROR_SESSION_NOT_FOUND
        );
        assert_eq!(
            error_code(&cash_out(&engine, 2, 90).await),
            ERROR_SESSION_NOT_FOUND
        );
        assert_eq!(
            error_code(&reveal(&engine, 1, 90, 36).await),
            ERROR_INVALID_CELL
        );

        let cell = safe_cell(&engine, 90).await;
        reveal(&engine, 1, 90, cell).await;
        assert_eq!(
            error_code(&reveal(&engine, 1, 90, cell).await),
            ERROR_ALREADY_REVEALED
        );
    }

    /// Registration, deposits, and effect grants behave as platform plumbing.
    #[tokio::test]
    async fn test_register_deposit_and_grants() {
        let engine = engine();

        let events = engine
            .submit_at(
                1,
                Command::Deposit { amount: 100 },
                TEST_NOW,
                entropy(0),
            )
            .await;
        assert_eq!(error_code(&events), ERROR_PROFILE_NOT_FOUND);

        register(&engine, 1, "Nina").await;
        let events = register(&engine, 1, "Nina").await;
        assert_eq!(error_code(&events), ERROR_PROFILE_EXISTS);

        let events = engine
            .submit_at(
                1,
                Command::Deposit { amount: 400 },
                TEST_NOW,
                entropy(0),
            )
            .await;
        assert!(matches!(
            events[0],
            Event::PointsDeposited {
                amount: 400,
                balance: 1_400,
                ..
            }
        ));

        // Deposits clip at the faucet cap.
        let events = engine
            .submit_at(
                1,
                Command::Deposit { amount: 50_000 },
                TEST_NOW,
                entropy(0),
            )
            .await;
        assert!(matches!(
            events[0],
            Event::PointsDeposited {
                amount: 1_000,
                balance: 2_400,
                ..
            }
        ));

        let leaderboard = engine.leaderboard().await;
        assert_eq!(leaderboard.entries[0].points, 2_400);

        // Zero-valued and already-expired grants are refused.
        let events = grant(&engine, 1, one_shot(EffectKind::MineReduction, 0)).await;
        assert_eq!(error_code(&events), ERROR_INVALID_EFFECT);
        let events = grant(
            &engine,
            1,
            Effect {
                kind: EffectKind::RewardMultiplier,
                value: 12_000,
                expires_at: Some(TEST_NOW),
            },
        )
        .await;
        assert_eq!(error_code(&events), ERROR_INVALID_EFFECT);
        assert!(engine.effects(1).await.is_empty());

        let events = grant(&engine, 1, one_shot(EffectKind::MineReduction, 2)).await;
        assert!(matches!(events[0], Event::EffectGranted { .. }));
        assert_eq!(engine.effects(1).await.len(), 1);
    }

    /// Every stake ends up settled, refunded, or still on the table.
    #[tokio::test]
    async fn test_stake_disposition_over_many_rounds() {
        let engine = engine();
        register(&engine, 1, "Oscar").await;
        register(&engine, 2, "Peggy").await;

        let mut open = 0u64;
        for round in 0..20u64 {
            let user = 1 + round % 2;
            let session_id = 100 + round;
            let bet = 10 + round;

            start(&engine, user, session_id, 6, 6, 8, bet).await;
            open += bet;
            audit(&engine, open).await;

            if round % 2 == 0 {
                let cell = mine_cell(&engine, session_id).await;
                reveal(&engine, user, session_id, cell).await;
            } else {
                let cell = safe_cell(&engine, session_id).await;
                reveal(&engine, user, session_id, cell).await;
                audit(&engine, open).await;
                cash_out(&engine, user, session_id).await;
            }
            open -= bet;
            audit(&engine, open).await;
        }

        // Leave one round on the table and supersede it.
        start(&engine, 1, 200, 6, 6, 8, 75).await;
        audit(&engine, 75).await;
        start(&engine, 1, 201, 6, 6, 8, 40).await;
        audit(&engine, 40).await;

        let treasury = engine.treasury().await;
        assert_eq!(treasury.total_refunded, 75);
        assert_eq!(treasury.rounds_settled, 20);
    }

    async fn audit(engine: &Engine<Memory>, open: u64) {
        let treasury = engine.treasury().await;
        assert!(treasury.conserved(), "treasury out of balance: {treasury:?}");
        assert_eq!(treasury.open_stakes, open);
    }
}
