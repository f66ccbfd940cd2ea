//! Last-seen bookkeeping: when was each item last observed purchasable.

use super::model::{StockCategory, StockItem};
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::HashMap;

/// Per-category record of the last positive-quantity observation per item.
///
/// Entries are only ever overwritten by a newer positive observation; an
/// item dropping to zero keeps its previous timestamp. That is the intended
/// semantic: the index answers "when did I last see this available", not
/// "is it available now". Entries are never removed for the process
/// lifetime; eviction is a deployment concern, not handled here.
#[derive(Debug, Default)]
pub struct LastSeenIndex {
    categories: HashMap<StockCategory, HashMap<String, DateTime<Tz>>>,
}

impl LastSeenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every active item of one category at `now`.
    pub fn record(&mut self, category: StockCategory, items: &[StockItem], now: DateTime<Tz>) {
        let entries = self.categories.entry(category).or_default();
        for item in items {
            if item.quantity > 0 {
                entries.insert(item.name.clone(), now);
            }
        }
    }

    /// Entries for one category, most recently seen first. Ties break by
    /// name so output is deterministic.
    pub fn entries(&self, category: StockCategory) -> Vec<(String, DateTime<Tz>)> {
        let mut list: Vec<(String, DateTime<Tz>)> = self
            .categories
            .get(&category)
            .map(|entries| entries.iter().map(|(n, t)| (n.clone(), *t)).collect())
            .unwrap_or_default();
        list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Manila;

    fn at(secs: i64) -> DateTime<Tz> {
        Manila.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn item(name: &str, quantity: u64) -> StockItem {
        StockItem {
            name: name.into(),
            quantity,
            emoji: None,
        }
    }

    #[test]
    fn test_zero_quantity_preserves_timestamp() {
        let mut index = LastSeenIndex::new();

        // 1. First positive observation sets the timestamp.
        index.record(StockCategory::Gear, &[item("Hoe", 2)], at(0));
        assert_eq!(index.entries(StockCategory::Gear), vec![("Hoe".to_string(), at(0))]);

        // 2. The item selling out does not clear or move it.
        index.record(StockCategory::Gear, &[item("Hoe", 0)], at(100));
        assert_eq!(index.entries(StockCategory::Gear), vec![("Hoe".to_string(), at(0))]);

        // 3. A later positive observation advances it.
        index.record(StockCategory::Gear, &[item("Hoe", 7)], at(200));
        assert_eq!(index.entries(StockCategory::Gear), vec![("Hoe".to_string(), at(200))]);
    }

    #[test]
    fn test_entries_sorted_most_recent_first() {
        let mut index = LastSeenIndex::new();
        index.record(StockCategory::Seed, &[item("Carrot", 1)], at(0));
        index.record(StockCategory::Seed, &[item("Tomato", 1)], at(50));
        index.record(StockCategory::Seed, &[item("Beet", 1)], at(25));

        let names: Vec<String> = index
            .entries(StockCategory::Seed)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["Tomato", "Beet", "Carrot"]);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut index = LastSeenIndex::new();
        index.record(StockCategory::Gear, &[item("Hoe", 1)], at(0));

        assert!(index.entries(StockCategory::Seed).is_empty());
        assert_eq!(index.entries(StockCategory::Gear).len(), 1);
    }
}
