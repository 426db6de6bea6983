//! Symbol grid

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GridSpec;
use crate::symbols::{SYMBOL_COUNT, Symbol};

/// A cell coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub column: u8,
    pub row: u8,
}

impl Position {
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }
}

/// Fixed-size `columns × rows` board, stored column-major
///
/// Every cell holds exactly one symbol; there is no empty state. Removal and
/// refill happen in one step in [`crate::generator::SymbolGenerator::refill_column`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    spec: GridSpec,
    cells: Vec<Symbol>,
}

impl Grid {
    /// A grid filled with one symbol
    pub fn filled(spec: GridSpec, symbol: Symbol) -> Self {
        Self {
            spec,
            cells: vec![symbol; spec.total_positions()],
        }
    }

    /// Build from columns (each listed top row first)
    ///
    /// # Panics
    ///
    /// Panics if the columns do not match `spec`.
    pub fn from_columns(spec: GridSpec, columns: Vec<Vec<Symbol>>) -> Self {
        assert_eq!(
            columns.len(),
            spec.reels as usize,
            "grid needs {} columns",
            spec.reels
        );
        let mut cells = Vec::with_capacity(spec.total_positions());
        for column in columns {
            assert_eq!(column.len(), spec.rows as usize, "grid needs {} rows", spec.rows);
            cells.extend(column);
        }
        Self { spec, cells }
    }

    /// Build by calling `f` for every position in column-major order
    pub fn from_fn(spec: GridSpec, mut f: impl FnMut(Position) -> Symbol) -> Self {
        let mut cells = Vec::with_capacity(spec.total_positions());
        for column in 0..spec.reels {
            for row in 0..spec.rows {
                cells.push(f(Position::new(column, row)));
            }
        }
        Self { spec, cells }
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    pub fn columns(&self) -> u8 {
        self.spec.reels
    }

    pub fn rows(&self) -> u8 {
        self.spec.rows
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            pos.column < self.spec.reels && pos.row < self.spec.rows,
            "position {pos:?} outside {}x{} grid",
            self.spec.reels,
            self.spec.rows
        );
        pos.column as usize * self.spec.rows as usize + pos.row as usize
    }

    pub fn get(&self, pos: Position) -> Symbol {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, symbol: Symbol) {
        let idx = self.index(pos);
        self.cells[idx] = symbol;
    }

    /// One column, top row first
    pub fn column(&self, column: u8) -> &[Symbol] {
        let rows = self.spec.rows as usize;
        let start = column as usize * rows;
        &self.cells[start..start + rows]
    }

    pub fn column_mut(&mut self, column: u8) -> &mut [Symbol] {
        let rows = self.spec.rows as usize;
        let start = column as usize * rows;
        &mut self.cells[start..start + rows]
    }

    /// All cells with their positions, column-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, Symbol)> + '_ {
        let rows = self.spec.rows as usize;
        self.cells.iter().enumerate().map(move |(idx, &symbol)| {
            let pos = Position::new((idx / rows) as u8, (idx % rows) as u8);
            (pos, symbol)
        })
    }

    /// Occurrences of one symbol
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|&&s| s == symbol).count()
    }

    /// Occurrence count of every symbol, indexed by [`Symbol::id`]
    pub fn counts(&self) -> [usize; SYMBOL_COUNT] {
        let mut counts = [0; SYMBOL_COUNT];
        for symbol in &self.cells {
            counts[symbol.id() as usize] += 1;
        }
        counts
    }

    /// Positions holding `symbol`, column-major
    pub fn positions_of(&self, symbol: Symbol) -> Vec<Position> {
        self.iter()
            .filter(|(_, s)| *s == symbol)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Rows as vectors, top row first (for renderers that draw row by row)
    pub fn to_rows(&self) -> Vec<Vec<Symbol>> {
        (0..self.spec.rows)
            .map(|row| {
                (0..self.spec.reels)
                    .map(|column| self.get(Position::new(column, row)))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.spec.rows {
            for column in 0..self.spec.reels {
                if column > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", self.get(Position::new(column, row)).glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> GridSpec {
        GridSpec { reels: 3, rows: 2 }
    }

    #[test]
    fn test_column_major_layout() {
        let grid = Grid::from_columns(
            spec(),
            vec![
                vec![Symbol::RedHeart, Symbol::Plum],
                vec![Symbol::Apple, Symbol::Grape],
                vec![Symbol::Bomb, Symbol::Lollipop],
            ],
        );
        assert_eq!(grid.get(Position::new(0, 1)), Symbol::Plum);
        assert_eq!(grid.get(Position::new(2, 0)), Symbol::Bomb);
        assert_eq!(grid.column(1), &[Symbol::Apple, Symbol::Grape]);
        assert_eq!(
            grid.to_rows()[0],
            vec![Symbol::RedHeart, Symbol::Apple, Symbol::Bomb]
        );
    }

    #[test]
    fn test_counts() {
        let mut grid = Grid::filled(spec(), Symbol::Banana);
        grid.set(Position::new(1, 1), Symbol::Lollipop);
        let counts = grid.counts();
        assert_eq!(counts[Symbol::Banana.id() as usize], 5);
        assert_eq!(grid.count(Symbol::Lollipop), 1);
        assert_eq!(grid.positions_of(Symbol::Lollipop), vec![Position::new(1, 1)]);
    }

    #[test]
    #[should_panic]
    fn test_wrong_shape_panics() {
        Grid::from_columns(spec(), vec![vec![Symbol::Apple; 2]; 2]);
    }

    #[test]
    fn test_display_rows() {
        let grid = Grid::filled(GridSpec { reels: 2, rows: 1 }, Symbol::RedHeart);
        assert_eq!(grid.to_string(), "H H\n");
    }
}
