use warren_types::minefield::{EffectKind, Session, SessionStatus, ERROR_INSUFFICIENT_FUNDS};

use super::super::*;
use crate::minefield::{self, buffs, grid, odds, payout, RevealOutcome};

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_start(
        &mut self,
        user: u64,
        session_id: u64,
        rows: u8,
        cols: u8,
        mines: u16,
        bet: u64,
    ) -> Vec<Event> {
        let mut profile = match load_profile(self, user).await {
            Some(profile) => profile,
            None => {
                return vec![self.round_error(user, Some(session_id), RoundError::ProfileNotFound)]
            }
        };

        // Parameters are judged before anything else so a malformed request
        // cannot end a round the caller still cares about.
        if let Err(error) = minefield::validate_round(rows, cols, mines, bet) {
            return vec![self.round_error(user, Some(session_id), error)];
        }
        if self.get(&Key::Session(session_id)).await.is_some() {
            return vec![self.round_error(user, Some(session_id), RoundError::SessionExists)];
        }

        let mut events = Vec::new();

        // Supersede: an abandoned active round hands its stake back in full
        // before the new wager is judged against the balance.
        let mut superseded = false;
        if let Some(prior_id) = profile.active_session {
            if let Some(Value::Session(mut prior)) = self.get(&Key::Session(prior_id)).await {
                if prior.is_active() {
                    prior.status = SessionStatus::CashedOut;
                    prior.ended_at = Some(self.now);
                    profile.balance = profile.balance.saturating_add(prior.bet);

                    let mut treasury = load_treasury(self).await;
                    treasury.refund(prior.bet);
                    self.insert(Key::Treasury, Value::Treasury(treasury));
                    self.insert(Key::Session(prior_id), Value::Session(prior.clone()));

                    events.push(Event::RoundForfeited {
                        session_id: prior_id,
                        user,
                        refund: prior.bet,
                        balance: profile.balance,
                    });
                    superseded = true;
                }
            }
            profile.active_session = None;
        }

        let effects = load_effects(self, user).await;
        let mine_reduction = buffs::total_value(&effects, EffectKind::MineReduction, self.now);
        let extra_safe_clicks =
            u16::try_from(buffs::total_value(&effects, EffectKind::ExtraSafeClick, self.now))
                .unwrap_or(u16::MAX);

        let total_cells = u16::from(rows) * u16::from(cols);
        let final_mines =
            minefield::final_mines(mines, mine_reduction, extra_safe_clicks, total_cells);

        if profile.balance < bet {
            // A supersede refund that already happened stands even though the
            // new round is refused.
            if superseded {
                self.insert(Key::Profile(user), Value::Profile(profile.clone()));
                self.update_leaderboard(user, &profile).await;
            }
            events.push(Event::MinefieldError {
                user,
                session_id: Some(session_id),
                code: ERROR_INSUFFICIENT_FUNDS,
                message: format!(
                    "Insufficient points: have {}, need {}",
                    profile.balance, bet
                ),
            });
            return events;
        }

        // Everything below stages together: grant consumption, the stake
        // debit, and the new session land in one commit or not at all.
        let retained = buffs::consume_one_shot(
            effects.clone(),
            &[EffectKind::MineReduction, EffectKind::ExtraSafeClick],
            self.now,
        );
        if retained != effects {
            if retained.is_empty() {
                self.remove(&Key::Effects(user));
            } else {
                self.insert(Key::Effects(user), Value::Effects(retained));
            }
        }

        profile.balance = profile.balance.saturating_sub(bet);
        profile.minefield_plays = profile.minefield_plays.saturating_add(1);
        profile.active_session = Some(session_id);

        let mut rng = grid::round_rng(self.entropy, session_id);
        let field = grid::scatter_mines(&mut rng, total_cells, final_mines);
        let session = Session {
            id: session_id,
            user,
            rows,
            cols,
            mines: field,
            nominal_mines: mines,
            revealed: Vec::new(),
            safe_count: 0,
            bet,
            extra_safe_clicks,
            status: SessionStatus::Active,
            started_at: self.now,
            ended_at: None,
        };

        let mut treasury = load_treasury(self).await;
        treasury.stake(bet);
        self.insert(Key::Treasury, Value::Treasury(treasury));
        self.insert(Key::Session(session_id), Value::Session(session));
        self.insert(Key::Profile(user), Value::Profile(profile.clone()));
        self.update_leaderboard(user, &profile).await;

        events.push(Event::RoundStarted {
            session_id,
            user,
            rows,
            cols,
            mines_count: final_mines,
            extra_safe_clicks,
            mine_reduction,
            balance: profile.balance,
        });
        events
    }

    pub(in crate::layer) async fn handle_reveal(
        &mut self,
        user: u64,
        session_id: u64,
        cell: u16,
    ) -> Vec<Event> {
        let mut session = match self.get(&Key::Session(session_id)).await {
            // A session someone else owns reads the same as no session at all.
            Some(Value::Session(session)) if session.user == user => session,
            _ => return vec![self.round_error(user, Some(session_id), RoundError::SessionNotFound)],
        };

        let outcome = match minefield::process_reveal(&mut session, cell) {
            Ok(outcome) => outcome,
            Err(error) => return vec![self.round_error(user, Some(session_id), error)],
        };

        if outcome == RevealOutcome::Exploded {
            let mut profile = match load_profile(self, user).await {
                Some(profile) => profile,
                None => {
                    return vec![self.round_error(
                        user,
                        Some(session_id),
                        RoundError::ProfileNotFound,
                    )]
                }
            };
            session.ended_at = Some(self.now);
            profile.active_session = None;
            profile.gambling_lost = profile.gambling_lost.saturating_add(session.bet);

            let mut treasury = load_treasury(self).await;
            treasury.settle_explosion(session.bet);
            self.insert(Key::Treasury, Value::Treasury(treasury));
            self.insert(Key::Profile(user), Value::Profile(profile));
            let mines = session.mines.clone();
            self.insert(Key::Session(session_id), Value::Session(session));

            return vec![Event::RoundExploded {
                session_id,
                user,
                cell,
                mines,
            }];
        }

        // Safe or absorbed: no points move, the caller just gets a fresh
        // quote for where the round now stands.
        let quote = self.quote(&session).await;
        let safe_count = session.safe_count;
        let extra_safe_clicks = session.extra_safe_clicks;
        self.insert(Key::Session(session_id), Value::Session(session));

        vec![Event::CellRevealed {
            session_id,
            cell,
            safe_count,
            potential_reward: quote.total,
            extra_safe_clicks,
        }]
    }

    pub(in crate::layer) async fn handle_cash_out(
        &mut self,
        user: u64,
        session_id: u64,
    ) -> Vec<Event> {
        let mut session = match self.get(&Key::Session(session_id)).await {
            Some(Value::Session(session)) if session.user == user => session,
            _ => return vec![self.round_error(user, Some(session_id), RoundError::SessionNotFound)],
        };
        if !session.is_active() {
            return vec![self.round_error(user, Some(session_id), RoundError::SessionEnded)];
        }
        if session.safe_count == 0 {
            return vec![self.round_error(user, Some(session_id), RoundError::NoRevealsYet)];
        }
        let mut profile = match load_profile(self, user).await {
            Some(profile) => profile,
            None => {
                return vec![self.round_error(user, Some(session_id), RoundError::ProfileNotFound)]
            }
        };

        // Settlement pays exactly what the last reveal quoted.
        let quote = self.quote(&session).await;

        let effects = load_effects(self, user).await;
        let retained =
            buffs::consume_one_shot(effects.clone(), &[EffectKind::RewardMultiplier], self.now);
        if retained != effects {
            if retained.is_empty() {
                self.remove(&Key::Effects(user));
            } else {
                self.insert(Key::Effects(user), Value::Effects(retained));
            }
        }

        session.status = SessionStatus::CashedOut;
        session.ended_at = Some(self.now);

        profile.balance = profile.balance.saturating_add(quote.total);
        profile.active_session = None;
        let profit = quote.total.saturating_sub(session.bet);
        if profit > 0 {
            profile.minefield_wins = profile.minefield_wins.saturating_add(1);
            profile.gambling_won = profile.gambling_won.saturating_add(profit);
        }

        let mut treasury = load_treasury(self).await;
        treasury.settle_cash_out(session.bet, quote.total);
        self.insert(Key::Treasury, Value::Treasury(treasury));
        self.insert(Key::Session(session_id), Value::Session(session));
        self.insert(Key::Profile(user), Value::Profile(profile.clone()));
        self.update_leaderboard(user, &profile).await;

        vec![Event::RoundCashedOut {
            session_id,
            user,
            reward: quote.total,
            balance: profile.balance,
        }]
    }

    /// Prices the session's cash-out as it stands right now.
    async fn quote(&self, session: &Session) -> payout::Payout {
        let effects = load_effects(self, session.user).await;
        let reward_bps = payout::reward_multiplier_bps(&effects, self.now);
        let multiplier = odds::multiplier(
            session.safe_count,
            session.nominal_mines,
            session.total_cells(),
        );
        payout::compute(session.bet, multiplier, reward_bps)
    }
}
