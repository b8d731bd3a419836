use super::*;
use commonware_codec::{Encode, ReadExt};

fn sample_session() -> Session {
    Session {
        id: 7,
        user: 42,
        rows: 6,
        cols: 6,
        mines: vec![3, 11, 12, 20, 21, 28, 30, 35],
        nominal_mines: 8,
        revealed: vec![14, 2, 33],
        safe_count: 3,
        bet: 100,
        extra_safe_clicks: 1,
        status: SessionStatus::Active,
        started_at: 1_700_000_000_000,
        ended_at: None,
    }
}

#[test]
fn test_session_roundtrip() {
    let session = sample_session();
    let encoded = session.encode();
    let decoded = Session::read(&mut &encoded[..]).unwrap();
    assert_eq!(session, decoded);
}

#[test]
fn test_session_rejects_unsorted_mines() {
    let mut session = sample_session();
    session.mines = vec![11, 3, 12];
    let encoded = session.encode();
    assert!(Session::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_session_cell_queries() {
    let session = sample_session();
    assert!(session.is_mine(12));
    assert!(!session.is_mine(13));
    assert!(session.is_revealed(14));
    assert!(!session.is_revealed(15));
    assert_eq!(session.total_cells(), 36);
}

#[test]
fn test_profile_roundtrip() {
    let profile = Profile::new("Clover".to_string(), 1_700_000_000_000);
    assert_eq!(profile.balance, STARTING_POINTS);
    let encoded = profile.encode();
    let decoded = Profile::read(&mut &encoded[..]).unwrap();
    assert_eq!(profile, decoded);
}

#[test]
fn test_effect_activity_window() {
    let one_shot = Effect {
        kind: EffectKind::MineReduction,
        value: 3,
        expires_at: None,
    };
    assert!(one_shot.one_shot());
    assert!(one_shot.active_at(u64::MAX));

    let timed = Effect {
        kind: EffectKind::RewardMultiplier,
        value: 12_000,
        expires_at: Some(1_000),
    };
    assert!(!timed.one_shot());
    assert!(timed.active_at(999));
    assert!(!timed.active_at(1_000));
}

#[test]
fn test_leaderboard_update() {
    let mut leaderboard = Leaderboard::default();

    for i in 0..15u64 {
        leaderboard.update(i, format!("User{}", i), (i + 1) * 1_000);
    }

    // Only the top 10 survive
    assert_eq!(leaderboard.entries.len(), 10);

    // Sorted descending by points
    for i in 0..9 {
        assert!(leaderboard.entries[i].points >= leaderboard.entries[i + 1].points);
    }

    // Ranks are 1-10
    for (i, entry) in leaderboard.entries.iter().enumerate() {
        assert_eq!(entry.rank, (i + 1) as u32);
    }

    // Re-updating an existing user moves them rather than duplicating
    leaderboard.update(14, "User14".to_string(), 1);
    assert_eq!(
        leaderboard
            .entries
            .iter()
            .filter(|e| e.user == 14)
            .count(),
        1
    );
}

#[test]
fn test_treasury_conservation() {
    let mut treasury = Treasury::default();
    treasury.stake(100);
    treasury.stake(250);
    assert_eq!(treasury.open_stakes, 350);
    assert!(treasury.conserved());

    treasury.refund(250);
    assert!(treasury.conserved());

    treasury.settle_cash_out(100, 117);
    assert!(treasury.conserved());
    assert_eq!(treasury.open_stakes, 0);
    assert_eq!(treasury.total_paid, 117);
    assert_eq!(treasury.net_pnl, -17);

    treasury.stake(50);
    treasury.settle_explosion(50);
    assert!(treasury.conserved());
    assert_eq!(treasury.net_pnl, 33);
    assert_eq!(treasury.rounds_settled, 2);
}
