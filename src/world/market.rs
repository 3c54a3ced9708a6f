//! The shared European market.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::colony::{Commodity, ALL_COMMODITIES};

/// Price state of one commodity, in gold per 100 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub price: i32,
    pub equilibrium: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub entries: BTreeMap<Commodity, MarketEntry>,
}

impl Default for Market {
    fn default() -> Self {
        let entries = ALL_COMMODITIES
            .iter()
            .map(|c| {
                let price = default_price(*c);
                (
                    *c,
                    MarketEntry {
                        price,
                        equilibrium: price,
                    },
                )
            })
            .collect();
        Market { entries }
    }
}

const fn default_price(commodity: Commodity) -> i32 {
    match commodity {
        Commodity::Food => 1,
        Commodity::Lumber => 1,
        Commodity::Ore => 4,
        Commodity::Furs => 5,
        Commodity::Tools => 2,
        Commodity::Muskets => 3,
        Commodity::Horses => 2,
    }
}

impl Market {
    pub fn price(&self, commodity: Commodity) -> i32 {
        self.entries.get(&commodity).map_or(0, |e| e.price)
    }

    /// Moves every price one step toward its equilibrium.
    /// Returns the commodities whose price changed.
    pub fn evolve(&mut self) -> Vec<Commodity> {
        let mut changed = Vec::new();
        for (commodity, entry) in &mut self.entries {
            let step = (entry.equilibrium - entry.price).signum();
            if step != 0 {
                entry.price += step;
                changed.push(*commodity);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evolve_drifts_toward_equilibrium() {
        let mut market = Market::default();
        market.entries.get_mut(&Commodity::Furs).unwrap().price = 8;
        assert_eq!(market.evolve(), vec![Commodity::Furs]);
        assert_eq!(market.price(Commodity::Furs), 7);
        market.evolve();
        market.evolve();
        assert_eq!(market.price(Commodity::Furs), 5);
        assert!(market.evolve().is_empty());
    }
}
