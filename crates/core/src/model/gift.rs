use serde::{Deserialize, Serialize};

use crate::model::ids::GiftId;
use crate::money::Money;

/// A one-off tip a live-stream viewer can send to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gift {
    pub id: GiftId,
    pub name: String,
    pub icon: String,
    pub value: Money,
}

/// The set of gifts offered during live streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCatalog {
    gifts: Vec<Gift>,
}

impl GiftCatalog {
    #[must_use]
    pub fn new(gifts: Vec<Gift>) -> Self {
        Self { gifts }
    }

    #[must_use]
    pub fn gifts(&self) -> &[Gift] {
        &self.gifts
    }

    #[must_use]
    pub fn find(&self, id: GiftId) -> Option<&Gift> {
        self.gifts.iter().find(|gift| gift.id == id)
    }

    /// Gifts the given balance can pay for, cheapest first.
    #[must_use]
    pub fn affordable(&self, balance: Money) -> Vec<&Gift> {
        let mut gifts: Vec<&Gift> = self.gifts.iter().filter(|g| g.value <= balance).collect();
        gifts.sort_by_key(|g| g.value);
        gifts
    }
}

impl Default for GiftCatalog {
    fn default() -> Self {
        let gift = |id: u64, name: &str, icon: &str, units: i64| Gift {
            id: GiftId::new(id),
            name: name.to_owned(),
            icon: icon.to_owned(),
            value: Money::from_units(units),
        };
        Self::new(vec![
            gift(1, "Rose", "🌹", 1),
            gift(2, "Star", "⭐", 5),
            gift(3, "Crystal Ball", "🔮", 10),
            gift(4, "Diamond", "💎", 25),
            gift(5, "Crown", "👑", 50),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_five_gifts() {
        let catalog = GiftCatalog::default();
        assert_eq!(catalog.gifts().len(), 5);
        let crown = catalog.find(GiftId::new(5)).unwrap();
        assert_eq!(crown.name, "Crown");
        assert_eq!(crown.value, Money::from_units(50));
        assert!(catalog.find(GiftId::new(9)).is_none());
    }

    #[test]
    fn affordable_filters_by_balance() {
        let catalog = GiftCatalog::default();
        let names: Vec<_> = catalog
            .affordable(Money::from_units(10))
            .into_iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, ["Rose", "Star", "Crystal Ball"]);
    }
}
