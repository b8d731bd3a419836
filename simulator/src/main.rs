//! Minefield bot swarm - drives the engine with concurrent players and
//! audits the points economy when the dust settles.
//!
//! Usage:
//!   cargo run --release --bin warren-simulator -- [OPTIONS]
//!
//! Options:
//!   -b, --bots     Number of concurrent players (default: 50)
//!   -r, --rounds   Rounds each player attempts (default: 200)
//!   -s, --seed     Seed for player decision RNG (default: 42)

use anyhow::ensure;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};
use tracing::{info, warn};
use warren_engine::{Engine, Memory};
use warren_types::{
    minefield::{Effect, EffectKind},
    Command, Event,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bot swarm and economy audit for the minefield engine")]
struct Args {
    #[arg(short, long, default_value = "50")]
    bots: usize,

    #[arg(short, long, default_value = "200")]
    rounds: u64,

    #[arg(short, long, default_value = "42")]
    seed: u64,
}

/// Per-bot state tracking
struct BotState {
    user: u64,
    name: String,
    session_counter: AtomicU64,
    rounds_played: AtomicU64,
}

impl BotState {
    fn new(id: usize) -> Self {
        let user = id as u64 + 1;
        Self {
            user,
            name: format!("Bot{id:04}"),
            session_counter: AtomicU64::new(user * 1_000_000),
            rounds_played: AtomicU64::new(0),
        }
    }

    fn next_session_id(&self) -> u64 {
        self.session_counter.fetch_add(1, Ordering::Relaxed)
    }
}

/// Global metrics
struct Metrics {
    commands: AtomicU64,
    cash_outs: AtomicU64,
    explosions: AtomicU64,
    forfeits: AtomicU64,
    refused: AtomicU64,
    points_deposited: AtomicU64,
}

impl Metrics {
    fn new() -> Self {
        Self {
            commands: AtomicU64::new(0),
            cash_outs: AtomicU64::new(0),
            explosions: AtomicU64::new(0),
            forfeits: AtomicU64::new(0),
            refused: AtomicU64::new(0),
            points_deposited: AtomicU64::new(0),
        }
    }

    fn record(&self, events: &[Event]) {
        self.commands.fetch_add(1, Ordering::Relaxed);
        for event in events {
            match event {
                Event::RoundCashedOut { .. } => {
                    self.cash_outs.fetch_add(1, Ordering::Relaxed);
                }
                Event::RoundExploded { .. } => {
                    self.explosions.fetch_add(1, Ordering::Relaxed);
                }
                Event::RoundForfeited { .. } => {
                    self.forfeits.fetch_add(1, Ordering::Relaxed);
                }
                Event::MinefieldError { .. } => {
                    self.refused.fetch_add(1, Ordering::Relaxed);
                }
                Event::PointsDeposited { amount, .. } => {
                    self.points_deposited.fetch_add(*amount, Ordering::Relaxed);
                }
                _ => {}
            }
        }
    }
}

fn random_effect(rng: &mut StdRng, now_hint: u64) -> Effect {
    match rng.gen_range(0..3u8) {
        0 => Effect {
            kind: EffectKind::ExtraSafeClick,
            value: rng.gen_range(1..=2),
            expires_at: None,
        },
        1 => Effect {
            kind: EffectKind::MineReduction,
            value: rng.gen_range(1..=3),
            expires_at: None,
        },
        _ => Effect {
            kind: EffectKind::RewardMultiplier,
            value: rng.gen_range(11_000..=15_000),
            // Half the multipliers are one-shot, half run on a timer.
            expires_at: if rng.gen_bool(0.5) {
                None
            } else {
                Some(now_hint + 60_000)
            },
        },
    }
}

/// Run a single bot through its allotment of rounds.
async fn run_bot(
    engine: Arc<Engine<Memory>>,
    bot: Arc<BotState>,
    rounds: u64,
    seed: u64,
    metrics: Arc<Metrics>,
) {
    let mut rng = StdRng::seed_from_u64(seed ^ bot.user);

    let events = engine
        .submit(
            bot.user,
            Command::Register {
                name: bot.name.clone(),
            },
        )
        .await;
    metrics.record(&events);

    let now_hint = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);

    for round in 0..rounds {
        // Sprinkle in grants so buff paths see real traffic.
        if round % 10 == 4 {
            let effect = random_effect(&mut rng, now_hint);
            let events = engine
                .submit(bot.user, Command::GrantEffect { effect })
                .await;
            metrics.record(&events);
        }

        let session_id = bot.next_session_id();
        let rows = [5u8, 6, 8][rng.gen_range(0..3)];
        let cols = [5u8, 6, 9][rng.gen_range(0..3)];
        let total_cells = u16::from(rows) * u16::from(cols);
        let mines = rng.gen_range(2..=total_cells / 3);
        let bet = rng.gen_range(10..=60u64);

        let events = engine
            .submit(
                bot.user,
                Command::Start {
                    session_id,
                    rows,
                    cols,
                    mines,
                    bet,
                },
            )
            .await;
        metrics.record(&events);

        match events.last() {
            Some(Event::RoundStarted { .. }) => {}
            Some(Event::MinefieldError { .. }) => {
                // Broke: top up at the faucet and try again next round.
                let events = engine
                    .submit(bot.user, Command::Deposit { amount: 1_000 })
                    .await;
                metrics.record(&events);
                continue;
            }
            other => {
                warn!(user = bot.user, ?other, "unexpected start response");
                continue;
            }
        }

        bot.rounds_played.fetch_add(1, Ordering::Relaxed);

        // Every seventh round the bot walks away mid-game; the next start
        // supersedes it and the refund path gets exercised.
        if round % 7 == 3 {
            continue;
        }

        let target_safe = rng.gen_range(1..=4u16);
        let mut clicked: BTreeSet<u16> = BTreeSet::new();
        loop {
            let cell = loop {
                let candidate = rng.gen_range(0..total_cells);
                if clicked.insert(candidate) {
                    break candidate;
                }
            };

            let events = engine
                .submit(bot.user, Command::Reveal { session_id, cell })
                .await;
            metrics.record(&events);

            match events.last() {
                Some(Event::CellRevealed { safe_count, .. }) => {
                    if *safe_count >= target_safe {
                        let events = engine
                            .submit(bot.user, Command::CashOut { session_id })
                            .await;
                        metrics.record(&events);
                        break;
                    }
                }
                Some(Event::RoundExploded { .. }) => break,
                other => {
                    warn!(user = bot.user, ?other, "unexpected reveal response");
                    break;
                }
            }
        }
    }
}

/// Checks that every point the engine has seen is accounted for.
async fn audit(
    engine: &Engine<Memory>,
    bots: &[Arc<BotState>],
    metrics: &Metrics,
) -> anyhow::Result<()> {
    let treasury = engine.treasury().await;
    ensure!(
        treasury.conserved(),
        "stake disposition out of balance: {treasury:?}"
    );

    let mut balances = 0u64;
    let mut open_bets = 0u64;
    for bot in bots {
        let profile = engine
            .profile(bot.user)
            .await
            .ok_or_else(|| anyhow::anyhow!("profile missing for {}", bot.user))?;
        balances += profile.balance;
        if let Some(session_id) = profile.active_session {
            if let Some(session) = engine.session(session_id).await {
                if session.is_active() {
                    open_bets += session.bet;
                }
            }
        }
    }

    ensure!(
        open_bets == treasury.open_stakes,
        "open stakes {} != live session bets {}",
        treasury.open_stakes,
        open_bets
    );

    // Minted points (registration grants plus faucet deposits) must equal
    // what players hold, what sits on the table, and what the house netted.
    let minted = bots.len() as u64 * warren_types::minefield::STARTING_POINTS
        + metrics.points_deposited.load(Ordering::Relaxed);
    let held = i128::from(balances) + i128::from(treasury.open_stakes) + treasury.net_pnl;
    ensure!(
        held == i128::from(minted),
        "points drifted: minted {minted}, accounted {held}"
    );

    info!(
        staked = treasury.total_staked,
        settled = treasury.total_settled,
        refunded = treasury.total_refunded,
        paid = treasury.total_paid,
        net_pnl = %treasury.net_pnl,
        "economy audit passed"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!(
        "Starting minefield swarm with {} bots x {} rounds",
        args.bots, args.rounds
    );

    let engine = Arc::new(Engine::new(Memory::default()));
    let bots: Vec<Arc<BotState>> = (0..args.bots).map(|i| Arc::new(BotState::new(i))).collect();
    let metrics = Arc::new(Metrics::new());

    let start_time = Instant::now();
    let mut handles = Vec::new();
    for bot in &bots {
        let engine = Arc::clone(&engine);
        let bot = Arc::clone(bot);
        let metrics = Arc::clone(&metrics);
        let rounds = args.rounds;
        let seed = args.seed;

        handles.push(tokio::spawn(async move {
            run_bot(engine, bot, rounds, seed, metrics).await;
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    let elapsed = start_time.elapsed();
    let commands = metrics.commands.load(Ordering::Relaxed);
    let rounds_played: u64 = bots
        .iter()
        .map(|bot| bot.rounds_played.load(Ordering::Relaxed))
        .sum();
    let cps = if elapsed.as_secs() > 0 {
        commands as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    info!("=== SWARM RESULTS ===");
    info!("Duration: {:.2}s", elapsed.as_secs_f64());
    info!("Rounds started: {}", rounds_played);
    info!(
        "Commands: {} total, {:.2}/s, {} refused",
        commands,
        cps,
        metrics.refused.load(Ordering::Relaxed)
    );
    info!(
        "Outcomes: {} cashed out, {} exploded, {} forfeited",
        metrics.cash_outs.load(Ordering::Relaxed),
        metrics.explosions.load(Ordering::Relaxed),
        metrics.forfeits.load(Ordering::Relaxed)
    );

    audit(&engine, &bots, &metrics).await?;

    info!("Final leaderboard:");
    let leaderboard = engine.leaderboard().await;
    for entry in &leaderboard.entries {
        info!("  #{}: {} - {} points", entry.rank, entry.name, entry.points);
    }

    Ok(())
}
