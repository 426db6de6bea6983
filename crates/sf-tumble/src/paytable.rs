//! Pays-anywhere win evaluation

use serde::{Deserialize, Serialize};

use crate::config::{FreeSpinsConfig, SlotConfig, WinRules};
use crate::credits::{Credits, PayValue};
use crate::grid::{Grid, Position};
use crate::symbols::{Symbol, SymbolCatalog};

/// A paying symbol group found by one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvent {
    /// Winning symbol
    pub symbol: Symbol,
    /// Every cell holding the symbol, column-major
    pub positions: Vec<Position>,
    /// Number of matching symbols
    pub count: usize,
    /// Pay tier index (0-based)
    pub tier: usize,
    /// Pay table value for the tier
    pub pay: PayValue,
    /// Round multiplier the win was computed with
    pub multiplier: u32,
    /// bet × pay × multiplier
    pub win_amount: Credits,
}

/// Scores grids against the catalog's pay tables
#[derive(Debug, Clone)]
pub struct WinEvaluator {
    catalog: SymbolCatalog,
    rules: WinRules,
    free_spins: FreeSpinsConfig,
}

impl WinEvaluator {
    pub fn new(config: &SlotConfig) -> Self {
        Self {
            catalog: config.catalog.clone(),
            rules: config.win_rules.clone(),
            free_spins: config.free_spins.clone(),
        }
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Pay tier for a symbol count
    ///
    /// The tier is the index of the highest breakpoint not above `count`;
    /// counts past the last breakpoint stay on the top tier.
    pub fn tier_for_count(&self, count: usize) -> Option<usize> {
        if count < self.rules.min_win_count as usize {
            return None;
        }
        self.rules
            .count_breakpoints
            .iter()
            .rposition(|&breakpoint| count >= breakpoint as usize)
    }

    /// All paying groups on the board, in catalog order
    ///
    /// Scatter and Multiplier symbols never pay here. The grid is not touched.
    pub fn evaluate(&self, grid: &Grid, bet: Credits, multiplier: u32) -> Vec<WinEvent> {
        let mut positions: Vec<Vec<Position>> = vec![Vec::new(); Symbol::ORDINARY.len()];
        for (pos, symbol) in grid.iter() {
            if let Some(idx) = symbol.ordinary_index() {
                positions[idx].push(pos);
            }
        }

        let mut wins = Vec::new();
        for (symbol, positions) in Symbol::ORDINARY.into_iter().zip(positions) {
            let count = positions.len();
            let Some(tier) = self.tier_for_count(count) else {
                continue;
            };
            let Some(pay) = self.catalog.pay(symbol, tier) else {
                continue;
            };
            if pay.hundredths() == 0 {
                continue;
            }
            wins.push(WinEvent {
                symbol,
                positions,
                count,
                tier,
                pay,
                multiplier,
                win_amount: bet.scaled(pay, multiplier),
            });
        }
        wins
    }

    pub fn scatter_count(&self, grid: &Grid) -> usize {
        grid.count(Symbol::SCATTER)
    }

    /// Enough scatters to start free spins from the base game
    pub fn check_scatter_trigger(&self, grid: &Grid) -> bool {
        self.scatter_count(grid) >= self.free_spins.trigger_count as usize
    }

    /// Enough scatters to add spins during free spins
    pub fn check_retrigger(&self, grid: &Grid) -> bool {
        self.scatter_count(grid) >= self.free_spins.retrigger_count as usize
    }
}

/// Deduplicated union of winning positions, column-major
pub fn removal_set(wins: &[WinEvent]) -> Vec<Position> {
    let mut positions: Vec<Position> = wins
        .iter()
        .flat_map(|win| win.positions.iter().copied())
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Sum of win amounts
pub fn total_win(wins: &[WinEvent]) -> Credits {
    wins.iter().map(|win| win.win_amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridSpec;

    fn evaluator() -> WinEvaluator {
        WinEvaluator::new(&SlotConfig::default())
    }

    /// A 6×5 board with `count` copies of `symbol` and no other paying group
    fn board_with(symbol: Symbol, count: usize) -> Grid {
        let filler: Vec<Symbol> = Symbol::ALL
            .into_iter()
            .filter(|&s| s != symbol && s != Symbol::Bomb)
            .collect();
        let mut n = 0;
        Grid::from_fn(GridSpec::standard_6x5(), |_| {
            let cell = if n < count {
                symbol
            } else {
                filler[(n - count) % filler.len()]
            };
            n += 1;
            cell
        })
    }

    #[test]
    fn test_tier_selection() {
        let evaluator = evaluator();
        assert_eq!(evaluator.tier_for_count(7), None);
        assert_eq!(evaluator.tier_for_count(8), Some(0));
        assert_eq!(evaluator.tier_for_count(11), Some(0));
        assert_eq!(evaluator.tier_for_count(12), Some(1));
        assert_eq!(evaluator.tier_for_count(14), Some(1));
        assert_eq!(evaluator.tier_for_count(15), Some(2));
        assert_eq!(evaluator.tier_for_count(19), Some(2));
        assert_eq!(evaluator.tier_for_count(20), Some(3));
        assert_eq!(evaluator.tier_for_count(100), Some(3));
    }

    #[test]
    fn test_tier_is_monotonic() {
        let evaluator = evaluator();
        let mut last = None;
        for count in 0..=60 {
            let tier = evaluator.tier_for_count(count);
            assert!(tier >= last, "tier dropped at count {count}");
            last = tier;
        }
    }

    #[test]
    fn test_nine_red_hearts_pay_tier_zero() {
        let grid = board_with(Symbol::RedHeart, 9);
        let wins = evaluator().evaluate(&grid, Credits::from_decimal(1.0), 1);

        assert_eq!(wins.len(), 1);
        let win = &wins[0];
        assert_eq!(win.symbol, Symbol::RedHeart);
        assert_eq!(win.count, 9);
        assert_eq!(win.positions.len(), 9);
        assert_eq!(win.tier, 0);
        assert_eq!(win.win_amount, Credits::from_decimal(5.0));
    }

    #[test]
    fn test_multiplier_scales_win() {
        let grid = board_with(Symbol::Banana, 12);
        let wins = evaluator().evaluate(&grid, Credits::from_decimal(2.0), 15);
        // 2.00 × 1.5 × 15
        assert_eq!(wins[0].win_amount, Credits::from_decimal(45.0));
        assert_eq!(wins[0].multiplier, 15);
    }

    #[test]
    fn test_specials_never_win() {
        let mut grid = Grid::filled(GridSpec::standard_6x5(), Symbol::Lollipop);
        assert!(evaluator().evaluate(&grid, Credits::from_decimal(1.0), 1).is_empty());
        grid = Grid::filled(GridSpec::standard_6x5(), Symbol::Bomb);
        assert!(evaluator().evaluate(&grid, Credits::from_decimal(1.0), 1).is_empty());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let grid = board_with(Symbol::Apple, 7);
        let before = grid.clone();
        let evaluator = evaluator();
        for _ in 0..3 {
            assert!(evaluator.evaluate(&grid, Credits::from_decimal(1.0), 1).is_empty());
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn test_removal_set_unions_wins() {
        let grid = Grid::from_fn(GridSpec::standard_6x5(), |pos| {
            if pos.column < 2 {
                Symbol::RedHeart
            } else if pos.column < 4 {
                Symbol::Grape
            } else {
                Symbol::Lollipop
            }
        });
        let wins = evaluator().evaluate(&grid, Credits::from_decimal(1.0), 1);
        assert_eq!(wins.len(), 2);
        let removed = removal_set(&wins);
        assert_eq!(removed.len(), 20);
        assert!(removed.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(removed.iter().all(|pos| pos.column < 4));
    }

    #[test]
    fn test_scatter_trigger_thresholds() {
        let evaluator = evaluator();
        let mut grid = Grid::filled(GridSpec::standard_6x5(), Symbol::Apple);
        for column in 0..3 {
            grid.set(Position::new(column, 0), Symbol::Lollipop);
        }
        assert!(!evaluator.check_scatter_trigger(&grid));
        assert!(evaluator.check_retrigger(&grid));
        grid.set(Position::new(3, 0), Symbol::Lollipop);
        assert!(evaluator.check_scatter_trigger(&grid));
    }
}
