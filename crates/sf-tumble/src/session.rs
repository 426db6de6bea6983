//! Player session state and its transitions
//!
//! Every mutation goes through a named transition. Player-facing transitions
//! return [`Declined`] instead of mutating when the rules forbid them; the
//! round-internal ones are driven only by the cascade engine.

use serde::{Deserialize, Serialize};

use crate::config::BetConfig;
use crate::credits::Credits;
use crate::error::Declined;
use crate::grid::Grid;
use crate::multiplier::MultiplierPool;

/// Direction for a bet level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetDirection {
    Up,
    Down,
}

/// Balance, bet, free spin and round bookkeeping for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    balance: Credits,
    bet_levels: Vec<Credits>,
    bet_level: usize,
    is_spinning: bool,
    is_free_spin: bool,
    buying_feature: bool,
    free_spins_remaining: u32,
    free_spins_total: u32,
    free_spins_total_win: Credits,
    total_win_this_round: Credits,
    last_win: Credits,
    multipliers: MultiplierPool,
    grid: Grid,
}

impl SessionState {
    pub fn new(bet: &BetConfig, grid: Grid) -> Self {
        Self {
            balance: bet.starting_balance,
            bet_levels: bet.levels.clone(),
            bet_level: bet.default_level.min(bet.levels.len().saturating_sub(1)),
            is_spinning: false,
            is_free_spin: false,
            buying_feature: false,
            free_spins_remaining: 0,
            free_spins_total: 0,
            free_spins_total_win: Credits::ZERO,
            total_win_this_round: Credits::ZERO,
            last_win: Credits::ZERO,
            multipliers: MultiplierPool::new(),
            grid,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SNAPSHOT ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn current_bet(&self) -> Credits {
        self.bet_levels[self.bet_level]
    }

    pub fn bet_level(&self) -> usize {
        self.bet_level
    }

    pub fn bet_levels(&self) -> &[Credits] {
        &self.bet_levels
    }

    pub fn is_spinning(&self) -> bool {
        self.is_spinning
    }

    pub fn is_free_spin(&self) -> bool {
        self.is_free_spin
    }

    /// The round in progress was bought
    pub fn is_buying_feature(&self) -> bool {
        self.buying_feature
    }

    pub fn free_spins_remaining(&self) -> u32 {
        self.free_spins_remaining
    }

    /// Spins awarded in the current (or last) feature, retriggers included
    pub fn free_spins_total(&self) -> u32 {
        self.free_spins_total
    }

    /// Winnings of the current (or last) free spins feature
    pub fn free_spins_total_win(&self) -> Credits {
        self.free_spins_total_win
    }

    pub fn total_win_this_round(&self) -> Credits {
        self.total_win_this_round
    }

    /// Total win of the last resolved round
    pub fn last_win(&self) -> Credits {
        self.last_win
    }

    pub fn current_multiplier(&self) -> u32 {
        self.multipliers.current()
    }

    pub fn multipliers(&self) -> &MultiplierPool {
        &self.multipliers
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYER TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Step one entry through the bet table, clamped at both ends
    pub fn change_bet(&mut self, direction: BetDirection) -> Result<Credits, Declined> {
        if self.is_spinning {
            return Err(Declined::RoundInProgress);
        }
        if self.is_free_spin {
            return Err(Declined::FeatureActive);
        }
        match direction {
            BetDirection::Up if self.bet_level + 1 < self.bet_levels.len() => self.bet_level += 1,
            BetDirection::Down if self.bet_level > 0 => self.bet_level -= 1,
            _ => {}
        }
        Ok(self.current_bet())
    }

    /// Add funds between rounds
    pub fn deposit(&mut self, amount: Credits) -> Result<Credits, Declined> {
        if self.is_spinning {
            return Err(Declined::RoundInProgress);
        }
        self.balance += amount;
        Ok(self.balance)
    }

    pub fn buy_feature_cost(&self, cost_multiplier: u32) -> Credits {
        self.current_bet().times(cost_multiplier)
    }

    fn debit(&self, amount: Credits) -> Result<Credits, Declined> {
        self.balance
            .checked_sub(amount)
            .ok_or(Declined::InsufficientBalance {
                required: amount,
                available: self.balance,
            })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROUND TRANSITIONS (driven by the cascade engine)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Debit the bet (nothing during free spins) and open a round
    pub(crate) fn begin_paid_round(&mut self) -> Result<Credits, Declined> {
        if self.is_spinning {
            return Err(Declined::RoundInProgress);
        }
        let cost = if self.is_free_spin {
            Credits::ZERO
        } else {
            self.current_bet()
        };
        self.balance = self.debit(cost)?;
        self.reset_for_new_round();
        Ok(cost)
    }

    /// Debit the buy-feature price, enter free spins and open the first one
    pub(crate) fn begin_bought_round(
        &mut self,
        cost_multiplier: u32,
        spins: u32,
    ) -> Result<Credits, Declined> {
        if self.is_spinning {
            return Err(Declined::RoundInProgress);
        }
        if self.is_free_spin {
            return Err(Declined::FeatureActive);
        }
        let cost = self.buy_feature_cost(cost_multiplier);
        self.balance = self.debit(cost)?;
        self.start_free_spins(spins);
        self.buying_feature = true;
        self.reset_for_new_round();
        Ok(cost)
    }

    fn reset_for_new_round(&mut self) {
        self.is_spinning = true;
        self.total_win_this_round = Credits::ZERO;
        self.multipliers.clear();
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }

    pub(crate) fn record_win(&mut self, amount: Credits) {
        self.total_win_this_round += amount;
    }

    pub(crate) fn collect_multiplier(&mut self, value: u32) {
        self.multipliers.push(value);
    }

    /// Pay the round total into the balance and close the round
    pub(crate) fn settle_round(&mut self) -> Credits {
        let total = self.total_win_this_round;
        self.balance += total;
        if self.is_free_spin {
            self.free_spins_total_win += total;
        }
        self.last_win = total;
        self.is_spinning = false;
        self.buying_feature = false;
        total
    }

    pub(crate) fn start_free_spins(&mut self, spins: u32) {
        self.is_free_spin = true;
        self.free_spins_remaining = spins;
        self.free_spins_total = spins;
        self.free_spins_total_win = Credits::ZERO;
    }

    pub(crate) fn retrigger_free_spins(&mut self, spins: u32) {
        self.free_spins_remaining += spins;
        self.free_spins_total += spins;
    }

    /// Use up one free spin; returns true when the feature ended
    pub(crate) fn consume_free_spin(&mut self) -> bool {
        self.free_spins_remaining = self.free_spins_remaining.saturating_sub(1);
        if self.free_spins_remaining == 0 {
            self.end_free_spins();
            true
        } else {
            false
        }
    }

    pub(crate) fn end_free_spins(&mut self) {
        self.is_free_spin = false;
        self.free_spins_remaining = 0;
    }
}
