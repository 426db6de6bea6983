//! Cascade engine — round orchestration
//!
//! A round moves `Idle → Spinning → Evaluating → (Tumbling → Evaluating)* →
//! Resolved → Idle`. [`TumbleEngine::start_round`] runs it to completion;
//! [`TumbleEngine::begin_round`] plus repeated [`TumbleEngine::advance_pass`]
//! drives the same sequence one pass at a time for animation pacing.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{MultiplierSweep, SlotConfig};
use crate::credits::Credits;
use crate::error::{ConfigError, Declined};
use crate::generator::SymbolGenerator;
use crate::grid::{Grid, Position};
use crate::multiplier::MultiplierTable;
use crate::paytable::{WinEvaluator, removal_set, total_win};
use crate::session::{BetDirection, SessionState};
use crate::spin::{
    CascadePass, FeatureAward, RoundKind, RoundOutcome, RoundPhase, RoundSettlement, WinTier,
};
use crate::symbols::{SpinMode, Symbol};

/// Cascading slot engine for one player session
pub struct TumbleEngine {
    /// Configuration
    config: SlotConfig,
    generator: SymbolGenerator,
    evaluator: WinEvaluator,
    multiplier_table: MultiplierTable,
    /// Random number generator
    rng: StdRng,
    session: SessionState,
    phase: RoundPhase,
    /// Round being resolved, if any
    round: Option<ActiveRound>,
    /// Rounds started so far
    round_count: u64,
    stats: SessionStats,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_rounds: u64,
    pub paid_rounds: u64,
    pub free_spin_rounds: u64,
    pub bought_features: u64,
    pub total_wagered: Credits,
    pub total_won: Credits,
    pub winning_rounds: u64,
    pub losing_rounds: u64,
    pub feature_triggers: u64,
    pub retriggers: u64,
    /// Winning passes across all rounds
    pub cascade_passes: u64,
    pub longest_chain: u32,
    pub multipliers_collected: u64,
    pub max_win_ratio: f64,
    pub capped_rounds: u64,
    pub pass_limit_rounds: u64,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_wagered.is_zero() {
            0.0
        } else {
            self.total_won.ratio_to(self.total_wagered) * 100.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_rounds > 0 {
            (self.winning_rounds as f64 / self.total_rounds as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveRound {
    id: u64,
    kind: RoundKind,
    mode: SpinMode,
    bet: Credits,
    cost: Credits,
    balance_before: Credits,
    passes: u32,
    winning_passes: u32,
    scatter_count: usize,
    triggers_feature: bool,
    retriggers_feature: bool,
    win_cap: Credits,
}

impl TumbleEngine {
    /// Create an engine with a validated config and an entropy-seeded RNG
    pub fn new(config: SlotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, StdRng::from_os_rng()))
    }

    /// Create an engine with a reproducible RNG stream
    pub fn with_seed(config: SlotConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, StdRng::seed_from_u64(seed)))
    }

    /// Reference game with an entropy-seeded RNG
    pub fn standard() -> Self {
        Self::build(SlotConfig::default(), StdRng::from_os_rng())
    }

    fn build(config: SlotConfig, mut rng: StdRng) -> Self {
        let generator = SymbolGenerator::new(&config);
        let evaluator = WinEvaluator::new(&config);
        let multiplier_table = MultiplierTable::new(&config.multipliers);
        let grid = generator.fill_grid(SpinMode::Base, &mut rng);
        let session = SessionState::new(&config.bet, grid);

        Self {
            config,
            generator,
            evaluator,
            multiplier_table,
            rng,
            session,
            phase: RoundPhase::Idle,
            round: None,
            round_count: 0,
            stats: SessionStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & SNAPSHOTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &WinEvaluator {
        &self.evaluator
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn balance(&self) -> Credits {
        self.session.balance()
    }

    pub fn current_bet(&self) -> Credits {
        self.session.current_bet()
    }

    pub fn last_win(&self) -> Credits {
        self.session.last_win()
    }

    pub fn is_free_spin(&self) -> bool {
        self.session.is_free_spin()
    }

    pub fn free_spins_remaining(&self) -> u32 {
        self.session.free_spins_remaining()
    }

    pub fn free_spins_total_win(&self) -> Credits {
        self.session.free_spins_total_win()
    }

    pub fn current_multiplier(&self) -> u32 {
        self.session.current_multiplier()
    }

    pub fn grid(&self) -> &Grid {
        self.session.grid()
    }

    pub fn buy_feature_cost(&self) -> Credits {
        self.session
            .buy_feature_cost(self.config.bet.buy_feature_cost_multiplier)
    }

    /// Get session stats
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Reset session stats
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYER ACTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Move one step through the bet table; only while idle outside free spins
    pub fn change_bet(&mut self, direction: BetDirection) -> Result<Credits, Declined> {
        if self.phase != RoundPhase::Idle {
            return Err(Declined::RoundInProgress);
        }
        self.session.change_bet(direction)
    }

    pub fn deposit(&mut self, amount: Credits) -> Result<Credits, Declined> {
        if self.phase != RoundPhase::Idle {
            return Err(Declined::RoundInProgress);
        }
        self.session.deposit(amount)
    }

    /// Run one round to completion
    pub fn start_round(&mut self, buy_feature: bool) -> Result<RoundOutcome, Declined> {
        self.begin_round(buy_feature)?;

        let (id, kind, bet) = match &self.round {
            Some(round) => (round.id, round.kind, round.bet),
            None => return Err(Declined::NoRoundInProgress),
        };

        let mut passes = Vec::new();
        loop {
            let pass = self.advance_pass()?;
            let resolved = pass.resolved;
            passes.push(pass);
            if resolved {
                break;
            }
        }

        let settlement = passes
            .last()
            .and_then(|pass| pass.settlement.clone())
            .ok_or(Declined::NoRoundInProgress)?;

        Ok(RoundOutcome {
            round_id: format!("round-{id:06}"),
            kind,
            bet,
            passes,
            settlement,
        })
    }

    /// Debit, reset round state and spin a fresh board
    ///
    /// Leaves the engine in `Evaluating`; call [`Self::advance_pass`] until a
    /// pass reports `resolved`.
    pub fn begin_round(&mut self, buy_feature: bool) -> Result<(), Declined> {
        if self.phase != RoundPhase::Idle {
            return Err(Declined::RoundInProgress);
        }

        let balance_before = self.session.balance();
        let (kind, cost) = if buy_feature {
            let cost = self.session.begin_bought_round(
                self.config.bet.buy_feature_cost_multiplier,
                self.config.free_spins.initial_spins,
            )?;
            log::info!(
                "Feature bought for {} ({} free spins)",
                cost,
                self.config.free_spins.initial_spins
            );
            (RoundKind::BuyFeature, cost)
        } else if self.session.is_free_spin() {
            let index =
                self.session.free_spins_total() - self.session.free_spins_remaining() + 1;
            let cost = self.session.begin_paid_round()?;
            (RoundKind::FreeSpin { index }, cost)
        } else {
            let cost = self.session.begin_paid_round()?;
            (RoundKind::Paid, cost)
        };

        self.phase = RoundPhase::Spinning;
        self.round_count += 1;

        let mode = SpinMode::from_free_spin(self.session.is_free_spin());
        let grid = self.generator.fill_grid(mode, &mut self.rng);
        let bet = self.session.current_bet();
        let scatter_count = self.evaluator.scatter_count(&grid);
        let triggers_feature = !kind.is_free_spin() && self.evaluator.check_scatter_trigger(&grid);
        let retriggers_feature = kind.is_free_spin()
            && self.config.free_spins.retrigger_enabled
            && self.evaluator.check_retrigger(&grid);
        self.session.set_grid(grid);

        self.round = Some(ActiveRound {
            id: self.round_count,
            kind,
            mode,
            bet,
            cost,
            balance_before,
            passes: 0,
            winning_passes: 0,
            scatter_count,
            triggers_feature,
            retriggers_feature,
            win_cap: bet.times(self.config.limits.max_win_multiplier),
        });
        self.phase = RoundPhase::Evaluating;

        log::debug!(
            "Round {} started ({:?}, bet {}, cost {}, {} scatters)",
            self.round_count,
            kind,
            bet,
            cost,
            scatter_count
        );
        Ok(())
    }

    /// Evaluate the current board once and, on a win, tumble it
    pub fn advance_pass(&mut self) -> Result<CascadePass, Declined> {
        let mut round = self.round.take().ok_or(Declined::NoRoundInProgress)?;
        round.passes += 1;

        let multiplier = self.session.current_multiplier();
        let grid = self.session.grid().clone();
        let wins = self.evaluator.evaluate(&grid, round.bet, multiplier);

        if wins.is_empty() {
            let settlement = self.resolve(&round, false, false);
            return Ok(CascadePass {
                index: round.passes,
                grid,
                wins,
                removed: Vec::new(),
                multipliers_collected: Vec::new(),
                multiplier,
                pass_win: Credits::ZERO,
                refilled: None,
                resolved: true,
                settlement: Some(settlement),
            });
        }

        round.winning_passes += 1;

        let room = round
            .win_cap
            .checked_sub(self.session.total_win_this_round())
            .unwrap_or(Credits::ZERO);
        let mut pass_win = total_win(&wins);
        let capped = pass_win >= room;
        if capped {
            pass_win = room;
        }
        self.session.record_win(pass_win);

        self.phase = RoundPhase::Tumbling;

        let mut removed = removal_set(&wins);
        let swept: Vec<Position> = match self.config.multipliers.sweep {
            MultiplierSweep::WinningPositions => removed
                .iter()
                .copied()
                .filter(|&pos| grid.get(pos) == Symbol::MULTIPLIER)
                .collect(),
            MultiplierSweep::OnWinningPass => grid.positions_of(Symbol::MULTIPLIER),
        };
        let mut multipliers_collected = Vec::with_capacity(swept.len());
        for _ in &swept {
            let value = self.multiplier_table.draw(&mut self.rng);
            self.session.collect_multiplier(value);
            multipliers_collected.push(value);
        }
        if !swept.is_empty() {
            removed.extend(swept);
            removed.sort_unstable();
            removed.dedup();
        }

        self.generator
            .refill(self.session.grid_mut(), &removed, round.mode, &mut self.rng);
        let refilled = self.session.grid().clone();

        log::debug!(
            "Round {} pass {}: {} wins paying {} at x{}, {} removed, collected {:?}",
            round.id,
            round.passes,
            wins.len(),
            pass_win,
            multiplier,
            removed.len(),
            multipliers_collected
        );

        let pass_limit_hit = round.passes >= self.config.limits.max_cascade_passes;
        if pass_limit_hit && !capped {
            log::warn!(
                "Round {} stopped after {} cascade passes",
                round.id,
                round.passes
            );
        }

        let settlement = if capped || pass_limit_hit {
            Some(self.resolve(&round, capped, pass_limit_hit && !capped))
        } else {
            self.phase = RoundPhase::Evaluating;
            self.round = Some(round.clone());
            None
        };

        Ok(CascadePass {
            index: round.passes,
            grid,
            wins,
            removed,
            multipliers_collected,
            multiplier,
            pass_win,
            refilled: Some(refilled),
            resolved: settlement.is_some(),
            settlement,
        })
    }

    /// Pay out, apply feature transitions and return to idle
    fn resolve(
        &mut self,
        round: &ActiveRound,
        capped: bool,
        pass_limit_hit: bool,
    ) -> RoundSettlement {
        self.phase = RoundPhase::Resolved;

        let total = self.session.settle_round();
        let mut feature = None;
        let mut free_spins_ended = false;

        if round.kind.is_free_spin() {
            if round.retriggers_feature {
                let spins = self.config.free_spins.retrigger_spins;
                self.session.retrigger_free_spins(spins);
                self.stats.retriggers += 1;
                feature = Some(FeatureAward::Retriggered { spins });
                log::info!("Free spins retriggered: +{spins}");
            }
            free_spins_ended = self.session.consume_free_spin();
            if free_spins_ended {
                log::info!(
                    "Free spins ended: {} won over {} spins",
                    self.session.free_spins_total_win(),
                    self.session.free_spins_total()
                );
            }
        } else if round.triggers_feature {
            let spins = self.config.free_spins.initial_spins;
            self.session.start_free_spins(spins);
            self.stats.feature_triggers += 1;
            feature = Some(FeatureAward::Triggered { spins });
            log::info!("Free spins triggered by {} scatters: {spins} spins", round.scatter_count);
        }

        let settlement = RoundSettlement {
            cost: round.cost,
            total_win: total,
            balance_before: round.balance_before,
            balance_after: self.session.balance(),
            multipliers: self.session.multipliers().values().to_vec(),
            scatter_count: round.scatter_count,
            feature,
            free_spins_remaining: self.session.free_spins_remaining(),
            free_spins_ended,
            free_spins_total_win: self.session.free_spins_total_win(),
            win_tier: WinTier::classify(total, round.bet, &self.config.win_tiers),
            capped,
            pass_limit_hit,
        };

        self.update_stats(round, &settlement);
        self.phase = RoundPhase::Idle;
        settlement
    }

    fn update_stats(&mut self, round: &ActiveRound, settlement: &RoundSettlement) {
        let stats = &mut self.stats;
        stats.total_rounds += 1;
        match round.kind {
            RoundKind::Paid => stats.paid_rounds += 1,
            RoundKind::FreeSpin { .. } => stats.free_spin_rounds += 1,
            RoundKind::BuyFeature => {
                stats.bought_features += 1;
                stats.free_spin_rounds += 1;
            }
        }
        stats.total_wagered += settlement.cost;
        stats.total_won += settlement.total_win;

        if settlement.total_win.is_zero() {
            stats.losing_rounds += 1;
        } else {
            stats.winning_rounds += 1;
        }

        stats.cascade_passes += round.winning_passes as u64;
        stats.longest_chain = stats.longest_chain.max(round.winning_passes);
        stats.multipliers_collected += settlement.multipliers.len() as u64;

        let ratio = settlement.total_win.ratio_to(round.bet);
        if ratio > stats.max_win_ratio {
            stats.max_win_ratio = ratio;
        }
        if settlement.capped {
            stats.capped_rounds += 1;
        }
        if settlement.pass_limit_hit {
            stats.pass_limit_rounds += 1;
        }
    }
}

impl Default for TumbleEngine {
    fn default() -> Self {
        Self::standard()
    }
}
