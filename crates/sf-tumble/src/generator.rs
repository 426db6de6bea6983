//! Weighted symbol generation and gravity refill

use rand::Rng;

use crate::config::{GridSpec, SlotConfig, SpecialSymbolConfig};
use crate::grid::{Grid, Position};
use crate::symbols::{SpinMode, Symbol};

/// Precomputed cumulative-weight distribution
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    /// (item, cumulative upper bound), zero-weight items dropped
    entries: Vec<(T, u64)>,
    total: u64,
}

impl<T: Copy> WeightedTable<T> {
    pub fn new(items: impl IntoIterator<Item = (T, u32)>) -> Self {
        let mut total = 0u64;
        let entries = items
            .into_iter()
            .filter(|(_, weight)| *weight > 0)
            .map(|(item, weight)| {
                total += weight as u64;
                (item, total)
            })
            .collect();
        Self { entries, total }
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Item whose cumulative range contains `roll`
    ///
    /// # Panics
    ///
    /// Panics if `roll >= total_weight()`.
    pub fn pick(&self, roll: u64) -> T {
        let idx = self.entries.partition_point(|&(_, upper)| upper <= roll);
        match self.entries.get(idx) {
            Some(&(item, _)) => item,
            None => panic!("roll {roll} outside weighted table of total {}", self.total),
        }
    }

    /// Draw uniformly in `[0, total_weight)`
    ///
    /// # Panics
    ///
    /// Panics on an empty table. Validated configs never produce one.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.pick(rng.random_range(0..self.total))
    }
}

/// Draws symbols for fresh spins and refills
#[derive(Debug, Clone)]
pub struct SymbolGenerator {
    grid: GridSpec,
    base: WeightedTable<Symbol>,
    free_spin: WeightedTable<Symbol>,
    specials: SpecialSymbolConfig,
}

impl SymbolGenerator {
    pub fn new(config: &SlotConfig) -> Self {
        let table = |mode| {
            WeightedTable::new(
                Symbol::ORDINARY
                    .into_iter()
                    .zip(config.catalog.weights(mode).iter().copied()),
            )
        };
        Self {
            grid: config.grid,
            base: table(SpinMode::Base),
            free_spin: table(SpinMode::FreeSpin),
            specials: config.specials.clone(),
        }
    }

    fn table(&self, mode: SpinMode) -> &WeightedTable<Symbol> {
        match mode {
            SpinMode::Base => &self.base,
            SpinMode::FreeSpin => &self.free_spin,
        }
    }

    /// Draw one symbol
    ///
    /// The weighted ordinary draw comes first, then the special overrides in
    /// fixed order. During free spins both the Multiplier and the Scatter
    /// check always roll, and a Scatter hit replaces a Multiplier hit.
    pub fn draw_symbol<R: Rng + ?Sized>(&self, mode: SpinMode, rng: &mut R) -> Symbol {
        let mut symbol = self.table(mode).draw(rng);

        match mode {
            SpinMode::Base => {
                if rng.random::<f64>() < self.specials.base_scatter_chance {
                    symbol = Symbol::SCATTER;
                }
            }
            SpinMode::FreeSpin => {
                if rng.random::<f64>() < self.specials.free_spin_multiplier_chance {
                    symbol = Symbol::MULTIPLIER;
                }
                if rng.random::<f64>() < self.specials.free_spin_scatter_chance {
                    symbol = Symbol::SCATTER;
                }
            }
        }

        symbol
    }

    /// A fresh board, one independent draw per cell
    pub fn fill_grid<R: Rng + ?Sized>(&self, mode: SpinMode, rng: &mut R) -> Grid {
        Grid::from_fn(self.grid, |_| self.draw_symbol(mode, rng))
    }

    /// Close the gaps left by `removed_rows` in one column
    ///
    /// Surviving symbols drop to the lowest rows keeping their order; the
    /// vacated top rows get fresh draws, top row first.
    pub fn refill_column<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        column: u8,
        removed_rows: &[u8],
        mode: SpinMode,
        rng: &mut R,
    ) {
        let rows = grid.rows() as usize;
        let mut removed = vec![false; rows];
        for &row in removed_rows {
            if let Some(slot) = removed.get_mut(row as usize) {
                *slot = true;
            }
        }

        let survivors: Vec<Symbol> = grid
            .column(column)
            .iter()
            .zip(&removed)
            .filter(|(_, gone)| !**gone)
            .map(|(symbol, _)| *symbol)
            .collect();
        let vacated = rows - survivors.len();
        if vacated == 0 {
            return;
        }

        let mut refilled = Vec::with_capacity(rows);
        for _ in 0..vacated {
            refilled.push(self.draw_symbol(mode, rng));
        }
        refilled.extend(survivors);

        grid.column_mut(column).copy_from_slice(&refilled);
    }

    /// Refill every column touched by `removed`, lowest column first
    pub fn refill<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        removed: &[Position],
        mode: SpinMode,
        rng: &mut R,
    ) {
        let mut rows_by_column: Vec<Vec<u8>> = vec![Vec::new(); grid.columns() as usize];
        for pos in removed {
            if let Some(rows) = rows_by_column.get_mut(pos.column as usize) {
                rows.push(pos.row);
            }
        }
        for (column, rows) in rows_by_column.iter().enumerate() {
            if !rows.is_empty() {
                self.refill_column(grid, column as u8, rows, mode, rng);
            }
        }
    }
}
