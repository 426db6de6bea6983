//! # sf-sim — Batch RTP Simulator
//!
//! Plays large numbers of rounds on independent engines across a rayon
//! thread pool and folds the results into one [`SimReport`].
//!
//! An *entry* is one paid spin (or one feature purchase) played through to
//! the end of any free spins it leads to. Only entries wager; free spins are
//! counted as part of the entry that earned them.
//!
//! ## Determinism
//!
//! Worker seeds are drawn from a ChaCha8 stream keyed by the batch seed, and
//! reports are merged in worker order, so the same `(seed, workers, rounds)`
//! always yields the same report.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sf_tumble::{
    ConfigError, Credits, Declined, FeatureAward, RoundOutcome, SlotConfig, TumbleEngine, WinTier,
};

/// Top-up applied when a worker's balance cannot cover the next entry,
/// as a multiple of the entry cost
const TOP_UP_ENTRIES: u32 = 1_000;

/// Simulation errors
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Round declined: {0}")]
    Declined(#[from] Declined),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Batch parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Entries to play across all workers
    pub rounds: u64,
    /// Master seed for the worker seed stream
    pub seed: u64,
    /// Worker threads, each with its own engine
    pub workers: usize,
    /// Buy the feature for every entry instead of spinning
    pub buy_feature: bool,
    /// Index into the bet table
    pub bet_level: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            rounds: 100_000,
            seed: 0,
            workers: num_cpus::get(),
            buy_feature: false,
            bet_level: 0,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.rounds == 0 {
            return Err(SimError::InvalidBatch("rounds must be positive".into()));
        }
        if self.workers == 0 {
            return Err(SimError::InvalidBatch("workers must be positive".into()));
        }
        Ok(())
    }

    /// Entries per worker; the remainder goes to the first workers
    pub fn split_rounds(&self) -> Vec<u64> {
        let workers = self.workers.max(1) as u64;
        let base = self.rounds / workers;
        let extra = self.rounds % workers;
        (0..workers).map(|i| base + u64::from(i < extra)).collect()
    }

    /// One engine seed per worker
    pub fn worker_seeds(&self) -> Vec<u64> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.workers).map(|_| rng.random()).collect()
    }
}

/// Rounds landing in each celebration bracket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTierCounts {
    pub win: u64,
    pub big_win: u64,
    pub mega_win: u64,
    pub giga_win: u64,
}

impl WinTierCounts {
    fn record(&mut self, tier: WinTier) {
        match tier {
            WinTier::Win => self.win += 1,
            WinTier::BigWin => self.big_win += 1,
            WinTier::MegaWin => self.mega_win += 1,
            WinTier::GigaWin => self.giga_win += 1,
        }
    }

    fn merge(&mut self, other: &WinTierCounts) {
        self.win += other.win;
        self.big_win += other.big_win;
        self.mega_win += other.mega_win;
        self.giga_win += other.giga_win;
    }
}

/// Aggregated batch results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    /// Paid or bought entries
    pub entries: u64,
    /// Every round played, free spins included
    pub total_rounds: u64,
    pub free_spin_rounds: u64,
    pub total_wagered: Credits,
    pub total_won: Credits,
    /// Won in paid base-game rounds
    pub base_won: Credits,
    /// Won in free spins, bought or triggered
    pub feature_won: Credits,
    /// Entries returning anything
    pub winning_entries: u64,
    pub feature_triggers: u64,
    pub retriggers: u64,
    /// Winning passes across all rounds
    pub cascade_passes: u64,
    pub longest_chain: u32,
    pub multipliers_collected: u64,
    pub max_entry_win: Credits,
    /// Best entry win over its cost
    pub max_win_ratio: f64,
    pub capped_rounds: u64,
    pub pass_limit_rounds: u64,
    pub win_tiers: WinTierCounts,
}

impl SimReport {
    /// Return to player in percent
    pub fn rtp(&self) -> f64 {
        if self.total_wagered.is_zero() {
            0.0
        } else {
            self.total_won.ratio_to(self.total_wagered) * 100.0
        }
    }

    /// Percentage of entries with a non-zero return
    pub fn hit_rate(&self) -> f64 {
        if self.entries == 0 {
            0.0
        } else {
            self.winning_entries as f64 / self.entries as f64 * 100.0
        }
    }

    /// Paid entries per feature trigger
    pub fn trigger_frequency(&self) -> Option<f64> {
        (self.feature_triggers > 0).then(|| self.entries as f64 / self.feature_triggers as f64)
    }

    pub fn merge(&mut self, other: &SimReport) {
        self.entries += other.entries;
        self.total_rounds += other.total_rounds;
        self.free_spin_rounds += other.free_spin_rounds;
        self.total_wagered += other.total_wagered;
        self.total_won += other.total_won;
        self.base_won += other.base_won;
        self.feature_won += other.feature_won;
        self.winning_entries += other.winning_entries;
        self.feature_triggers += other.feature_triggers;
        self.retriggers += other.retriggers;
        self.cascade_passes += other.cascade_passes;
        self.longest_chain = self.longest_chain.max(other.longest_chain);
        self.multipliers_collected += other.multipliers_collected;
        self.max_entry_win = self.max_entry_win.max(other.max_entry_win);
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
        self.capped_rounds += other.capped_rounds;
        self.pass_limit_rounds += other.pass_limit_rounds;
        self.win_tiers.merge(&other.win_tiers);
    }

    fn record_round(&mut self, outcome: &RoundOutcome) {
        let s = &outcome.settlement;
        self.total_rounds += 1;
        self.total_wagered += s.cost;
        self.total_won += s.total_win;
        if outcome.kind.is_free_spin() {
            self.free_spin_rounds += 1;
            self.feature_won += s.total_win;
        } else {
            self.base_won += s.total_win;
        }

        match s.feature {
            Some(FeatureAward::Triggered { .. }) => self.feature_triggers += 1,
            Some(FeatureAward::Retriggered { .. }) => self.retriggers += 1,
            None => {}
        }

        let chain = outcome.cascade_count() as u32;
        self.cascade_passes += chain as u64;
        self.longest_chain = self.longest_chain.max(chain);
        self.multipliers_collected += s.multipliers.len() as u64;
        if s.capped {
            self.capped_rounds += 1;
        }
        if s.pass_limit_hit {
            self.pass_limit_rounds += 1;
        }
        if let Some(tier) = s.win_tier {
            self.win_tiers.record(tier);
        }
    }

    fn record_entry(&mut self, cost: Credits, won: Credits) {
        self.entries += 1;
        if !won.is_zero() {
            self.winning_entries += 1;
        }
        self.max_entry_win = self.max_entry_win.max(won);
        let ratio = won.ratio_to(cost);
        if ratio > self.max_win_ratio {
            self.max_win_ratio = ratio;
        }
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entries:          {}", self.entries)?;
        writeln!(
            f,
            "Rounds:           {} ({} free spins)",
            self.total_rounds, self.free_spin_rounds
        )?;
        writeln!(f, "Wagered:          {}", self.total_wagered)?;
        writeln!(
            f,
            "Won:              {} (base {}, feature {})",
            self.total_won, self.base_won, self.feature_won
        )?;
        writeln!(f, "RTP:              {:.3}%", self.rtp())?;
        writeln!(f, "Hit rate:         {:.2}%", self.hit_rate())?;
        match self.trigger_frequency() {
            Some(freq) => writeln!(f, "Feature trigger:  1 in {freq:.1}")?,
            None => writeln!(f, "Feature trigger:  never")?,
        }
        writeln!(f, "Retriggers:       {}", self.retriggers)?;
        writeln!(
            f,
            "Cascades:         {} (longest chain {})",
            self.cascade_passes, self.longest_chain
        )?;
        writeln!(f, "Multipliers:      {}", self.multipliers_collected)?;
        writeln!(
            f,
            "Max entry win:    {} ({:.1}x)",
            self.max_entry_win, self.max_win_ratio
        )?;
        writeln!(
            f,
            "Win tiers:        {} win / {} big / {} mega / {} giga",
            self.win_tiers.win,
            self.win_tiers.big_win,
            self.win_tiers.mega_win,
            self.win_tiers.giga_win
        )?;
        write!(
            f,
            "Stopped rounds:   {} capped, {} at pass limit",
            self.capped_rounds, self.pass_limit_rounds
        )
    }
}

/// Play `entries` entries on one engine
pub fn run_worker(
    config: &SlotConfig,
    batch: &BatchConfig,
    entries: u64,
    seed: u64,
) -> Result<SimReport, SimError> {
    let mut config = config.clone();
    config.bet.default_level = batch.bet_level;
    let mut engine = TumbleEngine::with_seed(config, seed)?;
    let mut report = SimReport::default();

    for _ in 0..entries {
        let cost = if batch.buy_feature {
            engine.buy_feature_cost()
        } else {
            engine.current_bet()
        };
        if engine.balance() < cost {
            engine.deposit(cost.times(TOP_UP_ENTRIES))?;
        }

        let outcome = engine.start_round(batch.buy_feature)?;
        let mut won = outcome.total_win();
        report.record_round(&outcome);

        while engine.is_free_spin() {
            let outcome = engine.start_round(false)?;
            won += outcome.total_win();
            report.record_round(&outcome);
        }

        report.record_entry(cost, won);
    }

    log::debug!(
        "Worker {seed:#018x} finished {entries} entries at {:.2}% RTP",
        report.rtp()
    );
    Ok(report)
}

/// Run a batch across a dedicated thread pool
pub fn run_batch(config: &SlotConfig, batch: &BatchConfig) -> Result<SimReport, SimError> {
    batch.validate()?;
    config.validate()?;

    let jobs: Vec<(u64, u64)> = batch
        .split_rounds()
        .into_iter()
        .zip(batch.worker_seeds())
        .filter(|&(entries, _)| entries > 0)
        .collect();

    log::info!(
        "Simulating {} entries of '{}' on {} workers (seed {}, buy feature: {})",
        batch.rounds,
        config.name,
        jobs.len(),
        batch.seed,
        batch.buy_feature
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(batch.workers)
        .build()?;

    let reports: Vec<SimReport> = pool.install(|| {
        jobs.par_iter()
            .map(|&(entries, seed)| run_worker(config, batch, entries, seed))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut total = SimReport::default();
    for report in &reports {
        total.merge(report);
    }

    log::info!(
        "Batch finished: RTP {:.3}%, hit rate {:.2}%",
        total.rtp(),
        total.hit_rate()
    );
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_batch(rounds: u64, workers: usize) -> BatchConfig {
        BatchConfig {
            rounds,
            seed: 17,
            workers,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_split_rounds() {
        assert_eq!(small_batch(10, 3).split_rounds(), vec![4, 3, 3]);
        assert_eq!(small_batch(2, 4).split_rounds(), vec![1, 1, 0, 0]);
        assert_eq!(small_batch(8, 1).split_rounds(), vec![8]);
    }

    #[test]
    fn test_worker_seeds_reproducible() {
        let batch = small_batch(100, 4);
        let seeds = batch.worker_seeds();
        assert_eq!(seeds, batch.worker_seeds());
        assert_eq!(seeds.len(), 4);
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_invalid_batch() {
        let config = SlotConfig::default();
        assert!(matches!(
            run_batch(&config, &small_batch(0, 2)),
            Err(SimError::InvalidBatch(_))
        ));
        assert!(matches!(
            run_batch(&config, &small_batch(10, 0)),
            Err(SimError::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_bet_level_out_of_range() {
        let batch = BatchConfig {
            bet_level: 99,
            ..small_batch(10, 1)
        };
        assert!(matches!(
            run_batch(&SlotConfig::default(), &batch),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_batch_accounting() {
        let report = run_batch(&SlotConfig::default(), &small_batch(2_000, 2)).unwrap();
        assert_eq!(report.entries, 2_000);
        assert!(report.total_rounds >= report.entries);
        assert_eq!(report.total_rounds - report.free_spin_rounds, 2_000);
        assert_eq!(report.total_wagered, Credits::from_decimal(0.2).times(2_000));
        assert_eq!(report.base_won + report.feature_won, report.total_won);
        assert_relative_eq!(
            report.rtp(),
            report.total_won.as_decimal() / report.total_wagered.as_decimal() * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_batch_is_deterministic() {
        let config = SlotConfig::default();
        let a = run_batch(&config, &small_batch(500, 3)).unwrap();
        let b = run_batch(&config, &small_batch(500, 3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_buy_feature_batch() {
        let batch = BatchConfig {
            buy_feature: true,
            ..small_batch(20, 2)
        };
        let report = run_batch(&SlotConfig::default(), &batch).unwrap();
        assert_eq!(report.entries, 20);
        assert_eq!(report.total_wagered, Credits::from_decimal(20.0).times(20));
        assert!(report.free_spin_rounds >= 20 * 10);
        assert_eq!(report.base_won, Credits::ZERO);
        assert_eq!(report.feature_triggers, 0);
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut a = SimReport {
            entries: 3,
            total_won: Credits::from_decimal(1.5),
            longest_chain: 2,
            max_win_ratio: 4.0,
            ..SimReport::default()
        };
        let b = SimReport {
            entries: 2,
            total_won: Credits::from_decimal(0.5),
            longest_chain: 5,
            max_win_ratio: 1.0,
            ..SimReport::default()
        };
        a.merge(&b);
        assert_eq!(a.entries, 5);
        assert_eq!(a.total_won, Credits::from_decimal(2.0));
        assert_eq!(a.longest_chain, 5);
        assert_relative_eq!(a.max_win_ratio, 4.0);
    }
}
