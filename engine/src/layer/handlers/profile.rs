use warren_types::minefield::{Effect, Profile, MAX_DEPOSIT, MAX_EFFECTS};

use super::super::*;
use crate::state::load_leaderboard;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_register(&mut self, user: u64, name: &str) -> Vec<Event> {
        if self.get(&Key::Profile(user)).await.is_some() {
            return vec![self.round_error(user, None, RoundError::ProfileExists)];
        }

        let profile = Profile::new(name.to_string(), self.now);
        self.insert(Key::Profile(user), Value::Profile(profile.clone()));
        self.update_leaderboard(user, &profile).await;

        vec![Event::ProfileRegistered {
            user,
            name: name.to_string(),
        }]
    }

    pub(in crate::layer) async fn handle_deposit(&mut self, user: u64, amount: u64) -> Vec<Event> {
        let mut profile = match load_profile(self, user).await {
            Some(profile) => profile,
            None => return vec![self.round_error(user, None, RoundError::ProfileNotFound)],
        };

        // Faucet deposits are capped per command; anything above the cap is
        // silently clipped rather than refused.
        let amount = amount.min(MAX_DEPOSIT);
        profile.balance = profile.balance.saturating_add(amount);
        self.insert(Key::Profile(user), Value::Profile(profile.clone()));
        self.update_leaderboard(user, &profile).await;

        vec![Event::PointsDeposited {
            user,
            amount,
            balance: profile.balance,
        }]
    }

    pub(in crate::layer) async fn handle_grant_effect(
        &mut self,
        user: u64,
        effect: Effect,
    ) -> Vec<Event> {
        if load_profile(self, user).await.is_none() {
            return vec![self.round_error(user, None, RoundError::ProfileNotFound)];
        }
        if effect.value == 0 || !effect.active_at(self.now) {
            return vec![self.round_error(user, None, RoundError::InvalidEffect)];
        }

        let mut effects = load_effects(self, user).await;
        if effects.len() >= MAX_EFFECTS {
            return vec![self.round_error(user, None, RoundError::EffectsFull)];
        }
        effects.push(effect.clone());
        self.insert(Key::Effects(user), Value::Effects(effects));

        vec![Event::EffectGranted { user, effect }]
    }

    /// Mirrors a profile's points into the leaderboard after any balance
    /// change.
    pub(in crate::layer) async fn update_leaderboard(&mut self, user: u64, profile: &Profile) {
        let mut leaderboard = load_leaderboard(self).await;
        leaderboard.update(user, profile.name.clone(), profile.balance);
        self.insert(Key::Leaderboard, Value::Leaderboard(leaderboard));
    }
}
