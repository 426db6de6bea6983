//! Symbol definitions and the symbol catalog

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credits::PayValue;

/// Number of ordinary (paying) symbols
pub const ORDINARY_SYMBOL_COUNT: usize = 9;

/// Total number of symbols, specials included
pub const SYMBOL_COUNT: usize = 11;

/// Number of payout tiers in every pay table
pub const PAY_TIERS: usize = 4;

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Regular paying symbol
    Ordinary,
    /// Triggers free spins by count, regardless of position
    Scatter,
    /// Contributes a random multiplier when swept in a winning pass
    Multiplier,
}

/// A grid symbol. Ordinary symbols are listed highest paying first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Symbol {
    RedHeart = 0,
    BlueCandy = 1,
    GreenCandy = 2,
    PurpleCandy = 3,
    Plum = 4,
    Watermelon = 5,
    Apple = 6,
    Grape = 7,
    Banana = 8,
    /// Scatter
    Lollipop = 9,
    /// Multiplier bomb
    Bomb = 10,
}

impl Symbol {
    /// Ordinary symbols in catalog order
    pub const ORDINARY: [Symbol; ORDINARY_SYMBOL_COUNT] = [
        Symbol::RedHeart,
        Symbol::BlueCandy,
        Symbol::GreenCandy,
        Symbol::PurpleCandy,
        Symbol::Plum,
        Symbol::Watermelon,
        Symbol::Apple,
        Symbol::Grape,
        Symbol::Banana,
    ];

    /// Every symbol in id order
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        Symbol::RedHeart,
        Symbol::BlueCandy,
        Symbol::GreenCandy,
        Symbol::PurpleCandy,
        Symbol::Plum,
        Symbol::Watermelon,
        Symbol::Apple,
        Symbol::Grape,
        Symbol::Banana,
        Symbol::Lollipop,
        Symbol::Bomb,
    ];

    pub const SCATTER: Symbol = Symbol::Lollipop;
    pub const MULTIPLIER: Symbol = Symbol::Bomb;

    /// Stable numeric id
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Look up by numeric id
    pub fn from_id(id: u8) -> Option<Symbol> {
        Self::ALL.get(id as usize).copied()
    }

    pub const fn kind(self) -> SymbolKind {
        match self {
            Symbol::Lollipop => SymbolKind::Scatter,
            Symbol::Bomb => SymbolKind::Multiplier,
            _ => SymbolKind::Ordinary,
        }
    }

    pub const fn is_ordinary(self) -> bool {
        matches!(self.kind(), SymbolKind::Ordinary)
    }

    /// Index into pay and weight tables; `None` for specials
    pub const fn ordinary_index(self) -> Option<usize> {
        if self.is_ordinary() {
            Some(self as usize)
        } else {
            None
        }
    }

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Symbol::RedHeart => "RED_HEART",
            Symbol::BlueCandy => "BLUE_CANDY",
            Symbol::GreenCandy => "GREEN_CANDY",
            Symbol::PurpleCandy => "PURPLE_CANDY",
            Symbol::Plum => "PLUM",
            Symbol::Watermelon => "WATERMELON",
            Symbol::Apple => "APPLE",
            Symbol::Grape => "GRAPE",
            Symbol::Banana => "BANANA",
            Symbol::Lollipop => "LOLLIPOP",
            Symbol::Bomb => "BOMB",
        }
    }

    /// Single-character code for compact grid dumps
    pub const fn glyph(self) -> char {
        match self {
            Symbol::RedHeart => 'H',
            Symbol::BlueCandy => 'B',
            Symbol::GreenCandy => 'G',
            Symbol::PurpleCandy => 'P',
            Symbol::Plum => 'U',
            Symbol::Watermelon => 'W',
            Symbol::Apple => 'A',
            Symbol::Grape => 'R',
            Symbol::Banana => 'N',
            Symbol::Lollipop => '$',
            Symbol::Bomb => '*',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pay values for the four count tiers (8, 12, 15, 20+ in the reference game)
pub type PayTable = [PayValue; PAY_TIERS];

/// Generation mode for symbol draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinMode {
    Base,
    FreeSpin,
}

impl SpinMode {
    pub fn from_free_spin(is_free_spin: bool) -> Self {
        if is_free_spin {
            SpinMode::FreeSpin
        } else {
            SpinMode::Base
        }
    }
}

/// Static pay and weight tables for the ordinary symbols
///
/// Tables are indexed by [`Symbol::ordinary_index`]; specials never appear in
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolCatalog {
    /// Pay table per ordinary symbol
    pub pay_tables: [PayTable; ORDINARY_SYMBOL_COUNT],
    /// Draw weights in the base game
    pub base_weights: [u32; ORDINARY_SYMBOL_COUNT],
    /// Draw weights during free spins
    pub free_spin_weights: [u32; ORDINARY_SYMBOL_COUNT],
}

impl SymbolCatalog {
    /// Reference catalog: uniform weights, pays for 8/12/15/20+ symbols
    pub fn standard() -> Self {
        fn pays(values: [f64; PAY_TIERS]) -> PayTable {
            values.map(PayValue::from_decimal)
        }

        Self {
            pay_tables: [
                pays([5.0, 10.0, 25.0, 50.0]),  // RED_HEART
                pays([4.0, 8.0, 20.0, 40.0]),   // BLUE_CANDY
                pays([3.0, 6.0, 15.0, 30.0]),   // GREEN_CANDY
                pays([2.5, 5.0, 12.0, 25.0]),   // PURPLE_CANDY
                pays([1.5, 4.0, 10.0, 20.0]),   // PLUM
                pays([1.25, 3.0, 8.0, 15.0]),   // WATERMELON
                pays([1.0, 2.5, 7.0, 12.0]),    // APPLE
                pays([0.8, 2.0, 6.0, 10.0]),    // GRAPE
                pays([0.5, 1.5, 5.0, 8.0]),     // BANANA
            ],
            base_weights: [1; ORDINARY_SYMBOL_COUNT],
            free_spin_weights: [1; ORDINARY_SYMBOL_COUNT],
        }
    }

    /// Pay table for a symbol, `None` for Scatter and Multiplier
    pub fn pay_table(&self, symbol: Symbol) -> Option<&PayTable> {
        symbol.ordinary_index().map(|idx| &self.pay_tables[idx])
    }

    /// Pay value for a symbol at a tier
    pub fn pay(&self, symbol: Symbol, tier: usize) -> Option<PayValue> {
        self.pay_table(symbol).and_then(|table| table.get(tier).copied())
    }

    /// Weight table for a generation mode
    pub fn weights(&self, mode: SpinMode) -> &[u32; ORDINARY_SYMBOL_COUNT] {
        match mode {
            SpinMode::Base => &self.base_weights,
            SpinMode::FreeSpin => &self.free_spin_weights,
        }
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specials_have_no_pay_table() {
        let catalog = SymbolCatalog::standard();
        assert!(catalog.pay_table(Symbol::Lollipop).is_none());
        assert!(catalog.pay_table(Symbol::Bomb).is_none());
        assert_eq!(
            catalog.pay(Symbol::RedHeart, 0),
            Some(PayValue::from_decimal(5.0))
        );
        assert_eq!(
            catalog.pay(Symbol::Watermelon, 0),
            Some(PayValue::from_hundredths(125))
        );
    }

    #[test]
    fn test_ids_are_stable() {
        for symbol in Symbol::ALL {
            assert_eq!(Symbol::from_id(symbol.id()), Some(symbol));
        }
        assert_eq!(Symbol::from_id(11), None);
    }

    #[test]
    fn test_ordinary_order_matches_pay_order() {
        let catalog = SymbolCatalog::standard();
        let top_pays: Vec<u32> = Symbol::ORDINARY
            .iter()
            .map(|s| catalog.pay(*s, 3).unwrap().hundredths())
            .collect();
        let mut sorted = top_pays.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(top_pays, sorted);
    }

    #[test]
    fn test_symbol_serde_name() {
        let json = serde_json::to_string(&Symbol::RedHeart).unwrap();
        assert_eq!(json, "\"RED_HEART\"");
    }
}
