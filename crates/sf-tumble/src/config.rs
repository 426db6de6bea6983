//! Slot engine configuration
//!
//! All tables are static data: built once (from defaults or a JSON/YAML file),
//! validated, and then shared read-only by the generator, evaluator and engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::credits::Credits;
use crate::error::ConfigError;
use crate::symbols::{PAY_TIERS, SymbolCatalog};

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    /// Reference 6×5 board
    pub fn standard_6x5() -> Self {
        Self { reels: 6, rows: 5 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_6x5()
    }
}

/// Pays-anywhere win rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRules {
    /// Fewest matching symbols that pay
    pub min_win_count: u8,
    /// Inclusive lower bounds of the pay tiers, ascending
    pub count_breakpoints: [u8; PAY_TIERS],
}

impl Default for WinRules {
    fn default() -> Self {
        Self {
            min_win_count: 8,
            count_breakpoints: [8, 12, 15, 20],
        }
    }
}

/// Chances of replacing a weighted draw with a special symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialSymbolConfig {
    /// Scatter override chance in the base game
    pub base_scatter_chance: f64,
    /// Multiplier override chance during free spins (checked first)
    pub free_spin_multiplier_chance: f64,
    /// Scatter override chance during free spins (checked second)
    pub free_spin_scatter_chance: f64,
}

impl Default for SpecialSymbolConfig {
    fn default() -> Self {
        Self {
            base_scatter_chance: 0.05,
            free_spin_multiplier_chance: 0.10,
            free_spin_scatter_chance: 0.05,
        }
    }
}

/// Free spins feature configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSpinsConfig {
    /// Scatters needed to trigger from the base game
    pub trigger_count: u8,
    /// Spins awarded on trigger (and on buy feature)
    pub initial_spins: u32,
    /// Scatters needed to retrigger during free spins
    pub retrigger_count: u8,
    /// Extra spins on retrigger
    pub retrigger_spins: u32,
    /// Whether retriggers are awarded at all; off in the reference game
    pub retrigger_enabled: bool,
}

impl Default for FreeSpinsConfig {
    fn default() -> Self {
        Self {
            trigger_count: 4,
            initial_spins: 10,
            retrigger_count: 3,
            retrigger_spins: 5,
            retrigger_enabled: false,
        }
    }
}

/// One entry in the multiplier value distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierWeight {
    pub value: u32,
    pub weight: u32,
}

/// Which Multiplier cells a winning pass collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierSweep {
    /// Only Multiplier cells inside the winning-position union. Winning
    /// positions only ever hold ordinary symbols, so nothing is collected.
    WinningPositions,
    /// Every Multiplier cell on the board, whenever the pass has a win. The
    /// collected cells are removed along with the winners.
    OnWinningPass,
}

/// Multiplier symbol configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierConfig {
    /// Value distribution for collected Multiplier symbols
    pub weights: Vec<MultiplierWeight>,
    /// Collection rule
    pub sweep: MultiplierSweep,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        let weights = [(2, 30), (3, 25), (5, 20), (10, 15), (25, 7), (50, 2), (100, 1)]
            .into_iter()
            .map(|(value, weight)| MultiplierWeight { value, weight })
            .collect();
        Self {
            weights,
            sweep: MultiplierSweep::OnWinningPass,
        }
    }
}

/// Bet table and balance settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetConfig {
    /// Available bets, ascending
    pub levels: Vec<Credits>,
    /// Index into `levels` at session start
    pub default_level: usize,
    /// Buy-feature price as a multiple of the current bet
    pub buy_feature_cost_multiplier: u32,
    /// Balance a new session starts with
    pub starting_balance: Credits,
}

impl Default for BetConfig {
    fn default() -> Self {
        let levels = [
            0.20, 0.40, 0.60, 0.80, 1.0, 2.0, 3.0, 4.0, 5.0, 10.0, 15.0, 20.0, 25.0, 50.0, 75.0,
            100.0,
        ]
        .into_iter()
        .map(Credits::from_decimal)
        .collect();
        Self {
            levels,
            default_level: 0,
            buy_feature_cost_multiplier: 100,
            starting_balance: Credits::from_decimal(1000.0),
        }
    }
}

/// Hard limits on a single round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Evaluation passes after which a cascade chain is stopped
    pub max_cascade_passes: u32,
    /// Round win cap as a multiple of the bet
    pub max_win_multiplier: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_cascade_passes: 100,
            max_win_multiplier: 21_100,
        }
    }
}

/// Win/bet ratios at which a round counts as a big, mega or giga win
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinTierThresholds {
    pub big_win: f64,
    pub mega_win: f64,
    pub giga_win: f64,
}

impl Default for WinTierThresholds {
    fn default() -> Self {
        Self {
            big_win: 10.0,
            mega_win: 25.0,
            giga_win: 50.0,
        }
    }
}

/// Volatility class of the math model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

/// Declared math profile; the batch simulator measures against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathProfile {
    /// Target return to player, in percent
    pub rtp_target: f64,
    pub volatility: Volatility,
}

impl Default for MathProfile {
    fn default() -> Self {
        Self {
            rtp_target: 96.48,
            volatility: Volatility::High,
        }
    }
}

/// Complete slot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub name: String,
    pub grid: GridSpec,
    pub catalog: SymbolCatalog,
    pub win_rules: WinRules,
    pub specials: SpecialSymbolConfig,
    pub free_spins: FreeSpinsConfig,
    pub multipliers: MultiplierConfig,
    pub bet: BetConfig,
    pub limits: LimitsConfig,
    pub win_tiers: WinTierThresholds,
    pub math: MathProfile,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            name: "Sweet Fall".into(),
            grid: GridSpec::default(),
            catalog: SymbolCatalog::standard(),
            win_rules: WinRules::default(),
            specials: SpecialSymbolConfig::default(),
            free_spins: FreeSpinsConfig::default(),
            multipliers: MultiplierConfig::default(),
            bet: BetConfig::default(),
            limits: LimitsConfig::default(),
            win_tiers: WinTierThresholds::default(),
            math: MathProfile::default(),
        }
    }
}

impl SlotConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SlotConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: SlotConfig = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the tables are internally consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.reels == 0 || self.grid.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.reels, self.grid.rows
            )));
        }

        let breakpoints = &self.win_rules.count_breakpoints;
        if breakpoints.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Invalid(format!(
                "count breakpoints must be strictly ascending: {breakpoints:?}"
            )));
        }
        if self.win_rules.min_win_count == 0 || self.win_rules.min_win_count < breakpoints[0] {
            return Err(ConfigError::Invalid(format!(
                "min win count {} must be at least the first breakpoint {}",
                self.win_rules.min_win_count, breakpoints[0]
            )));
        }

        if self.catalog.base_weights.iter().all(|&w| w == 0) {
            return Err(ConfigError::Invalid("base symbol weights are all zero".into()));
        }
        if self.catalog.free_spin_weights.iter().all(|&w| w == 0) {
            return Err(ConfigError::Invalid("free spin symbol weights are all zero".into()));
        }

        let free_spins = &self.free_spins;
        if free_spins.trigger_count == 0 || free_spins.retrigger_count == 0 {
            return Err(ConfigError::Invalid(format!(
                "scatter counts must be positive, got trigger {} and retrigger {}",
                free_spins.trigger_count, free_spins.retrigger_count
            )));
        }
        if free_spins.initial_spins == 0 {
            return Err(ConfigError::Invalid("initial_spins must be positive".into()));
        }

        let chances = [
            ("base_scatter_chance", self.specials.base_scatter_chance),
            ("free_spin_multiplier_chance", self.specials.free_spin_multiplier_chance),
            ("free_spin_scatter_chance", self.specials.free_spin_scatter_chance),
        ];
        for (name, chance) in chances {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {chance}")));
            }
        }

        let weights = &self.multipliers.weights;
        if weights.iter().map(|w| w.weight as u64).sum::<u64>() == 0 {
            return Err(ConfigError::Invalid("multiplier weights are all zero".into()));
        }
        if weights.iter().any(|w| w.value == 0) {
            return Err(ConfigError::Invalid("multiplier values must be positive".into()));
        }

        let levels = &self.bet.levels;
        if levels.is_empty() {
            return Err(ConfigError::Invalid("bet table is empty".into()));
        }
        if levels[0].is_zero() || levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Invalid(
                "bet levels must be positive and strictly ascending".into(),
            ));
        }
        if self.bet.default_level >= levels.len() {
            return Err(ConfigError::Invalid(format!(
                "default bet level {} is outside a table of {}",
                self.bet.default_level,
                levels.len()
            )));
        }

        if self.limits.max_cascade_passes == 0 {
            return Err(ConfigError::Invalid("max_cascade_passes must be positive".into()));
        }
        if self.limits.max_win_multiplier == 0 {
            return Err(ConfigError::Invalid("max_win_multiplier must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        SlotConfig::default().validate().unwrap();
    }

    #[test]
    fn test_reference_values() {
        let config = SlotConfig::default();
        assert_eq!(config.grid.total_positions(), 30);
        assert_eq!(config.bet.levels.len(), 16);
        assert_eq!(config.bet.levels[0], Credits::from_cents(20));
        assert_eq!(config.bet.levels[15], Credits::from_cents(10_000));
        let total: u32 = config.multipliers.weights.iter().map(|w| w.weight).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SlotConfig::default();
        let json = config.to_json().unwrap();
        let back = SlotConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "name: Tiny\ngrid:\n  reels: 4\n  rows: 4\n";
        let config = SlotConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, "Tiny");
        assert_eq!(config.grid.total_positions(), 16);
        assert_eq!(config.free_spins.initial_spins, 10);
    }

    #[test]
    fn test_rejects_descending_breakpoints() {
        let mut config = SlotConfig::default();
        config.win_rules.count_breakpoints = [8, 15, 12, 20];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unsorted_bets() {
        let mut config = SlotConfig::default();
        config.bet.levels.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_chance() {
        let mut config = SlotConfig::default();
        config.specials.free_spin_multiplier_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retrigger_off_by_default() {
        assert!(!FreeSpinsConfig::default().retrigger_enabled);
    }

    #[test]
    fn test_rejects_zero_trigger_count() {
        let mut config = SlotConfig::default();
        config.free_spins.trigger_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_retrigger_count() {
        let mut config = SlotConfig::default();
        config.free_spins.retrigger_enabled = true;
        config.free_spins.retrigger_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_initial_spins() {
        let mut config = SlotConfig::default();
        config.free_spins.initial_spins = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            SlotConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
