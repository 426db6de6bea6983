//! Round multiplier accumulation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MultiplierConfig;
use crate::generator::WeightedTable;

/// Multiplier values collected during one round
///
/// The round multiplier is the sum of the pool, or 1 while it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierPool {
    values: Vec<u32>,
    total: u32,
}

impl MultiplierPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: u32) {
        self.values.push(value);
        self.total = self.total.saturating_add(value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.total = 0;
    }

    /// Multiplier applied to wins computed from now on
    pub fn current(&self) -> u32 {
        if self.values.is_empty() { 1 } else { self.total }
    }

    /// Collected values in order
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Draws the value carried by a collected Multiplier symbol
#[derive(Debug, Clone)]
pub struct MultiplierTable {
    table: WeightedTable<u32>,
}

impl MultiplierTable {
    pub fn new(config: &MultiplierConfig) -> Self {
        Self {
            table: WeightedTable::new(config.weights.iter().map(|w| (w.value, w.weight))),
        }
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.table.draw(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_empty_pool_is_one() {
        let pool = MultiplierPool::new();
        assert_eq!(pool.current(), 1);
    }

    #[test]
    fn test_pool_sums() {
        let mut pool = MultiplierPool::new();
        pool.push(2);
        assert_eq!(pool.current(), 2);
        pool.push(10);
        assert_eq!(pool.current(), 12);
        assert_eq!(pool.values(), &[2, 10]);
        pool.clear();
        assert_eq!(pool.current(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_draws_only_configured_values() {
        let config = MultiplierConfig::default();
        let table = MultiplierTable::new(&config);
        let mut rng = StdRng::seed_from_u64(5);
        let allowed: Vec<u32> = config.weights.iter().map(|w| w.value).collect();
        let mut twos = 0;
        for _ in 0..10_000 {
            let value = table.draw(&mut rng);
            assert!(allowed.contains(&value));
            if value == 2 {
                twos += 1;
            }
        }
        // weight 30 of 100
        assert!((2_600..3_400).contains(&twos), "drew {twos} twos");
    }
}
