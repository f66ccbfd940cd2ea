//! # Feed Wire Model
//!
//! The upstream feed pushes a full shop snapshot in every data frame:
//! `{status, data: {gear, seed, egg, cosmetics, honey, travelingmerchant}}`.
//! The `honey` key carries the in-game event shop. Categories absent from a
//! payload are treated as present-but-empty, so downstream code always sees
//! all six categories.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Fixed stock groupings. Declaration order is the display order, which is
/// why the derived `Ord` is load-bearing here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StockCategory {
    Gear,
    Seed,
    Egg,
    Cosmetics,
    Event,
    TravelingMerchant,
}

impl StockCategory {
    /// All categories in display order.
    pub const ALL: [StockCategory; 6] = [
        StockCategory::Gear,
        StockCategory::Seed,
        StockCategory::Egg,
        StockCategory::Cosmetics,
        StockCategory::Event,
        StockCategory::TravelingMerchant,
    ];

    /// Section heading used in rendered notifications.
    pub fn label(&self) -> &'static str {
        match self {
            StockCategory::Gear => "🛠️ Gear",
            StockCategory::Seed => "🌱 Seeds",
            StockCategory::Egg => "🥚 Eggs",
            StockCategory::Cosmetics => "🎨 Cosmetics",
            StockCategory::Event => "🎉 Event",
            StockCategory::TravelingMerchant => "🚚 Traveling Merchant",
        }
    }

    /// Whether item emoji are rendered for this section.
    pub fn uses_emoji(&self) -> bool {
        matches!(
            self,
            StockCategory::Gear | StockCategory::Seed | StockCategory::Egg
        )
    }

    /// Parses a user-supplied category token. Tolerates plural forms and
    /// the feed's own key spellings; anything else is `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "gear" => Some(StockCategory::Gear),
            "seed" | "seeds" => Some(StockCategory::Seed),
            "egg" | "eggs" => Some(StockCategory::Egg),
            "cosmetics" => Some(StockCategory::Cosmetics),
            "event" | "honey" => Some(StockCategory::Event),
            "travelingmerchant" | "traveling-merchant" | "merchant" => {
                Some(StockCategory::TravelingMerchant)
            }
            _ => None,
        }
    }
}

impl fmt::Display for StockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StockCategory::Gear => "gear",
            StockCategory::Seed => "seed",
            StockCategory::Egg => "egg",
            StockCategory::Cosmetics => "cosmetics",
            StockCategory::Event => "event",
            StockCategory::TravelingMerchant => "travelingmerchant",
        })
    }
}

/// A single shop entry from the feed. A zero quantity means the item is
/// listed but not currently purchasable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// One category's slice of a feed tick.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategorySnapshot {
    #[serde(default)]
    pub items: Vec<StockItem>,
    #[serde(default)]
    pub countdown: Option<String>,
    /// Arrival window, only populated for the traveling merchant.
    #[serde(default, rename = "appearIn")]
    pub appear_in: Option<String>,
}

impl CategorySnapshot {
    /// Items currently purchasable (quantity above zero).
    pub fn active_items(&self) -> impl Iterator<Item = &StockItem> {
        self.items.iter().filter(|i| i.quantity > 0)
    }
}

/// Envelope around every frame the feed pushes. Control frames carry a
/// non-`success` status or no data at all.
#[derive(Debug, Deserialize)]
pub struct FeedEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<RawStockData>,
}

/// Raw category layout exactly as the feed sends it.
#[derive(Debug, Default, Deserialize)]
pub struct RawStockData {
    #[serde(default)]
    pub gear: Option<CategorySnapshot>,
    #[serde(default)]
    pub seed: Option<CategorySnapshot>,
    #[serde(default)]
    pub egg: Option<CategorySnapshot>,
    #[serde(default)]
    pub cosmetics: Option<CategorySnapshot>,
    #[serde(default)]
    pub honey: Option<CategorySnapshot>,
    #[serde(default)]
    pub travelingmerchant: Option<CategorySnapshot>,
}

/// One atomically-taken snapshot across all categories. Always holds an
/// entry for every category; missing ones are defaulted at construction.
#[derive(Debug, Clone)]
pub struct FeedTick {
    snapshots: BTreeMap<StockCategory, CategorySnapshot>,
}

impl FeedTick {
    /// Builds a tick from a raw payload, defaulting absent categories to an
    /// empty snapshot. The `honey` key feeds the event category.
    pub fn from_raw(raw: RawStockData) -> Self {
        let mut snapshots = BTreeMap::new();
        snapshots.insert(StockCategory::Gear, raw.gear.unwrap_or_default());
        snapshots.insert(StockCategory::Seed, raw.seed.unwrap_or_default());
        snapshots.insert(StockCategory::Egg, raw.egg.unwrap_or_default());
        snapshots.insert(StockCategory::Cosmetics, raw.cosmetics.unwrap_or_default());
        snapshots.insert(StockCategory::Event, raw.honey.unwrap_or_default());
        snapshots.insert(
            StockCategory::TravelingMerchant,
            raw.travelingmerchant.unwrap_or_default(),
        );
        Self { snapshots }
    }

    /// A tick with every category empty.
    pub fn empty() -> Self {
        Self::from_raw(RawStockData::default())
    }

    /// Parses one raw text frame into a tick. Returns `None` for anything
    /// that is not a well-formed `success` data frame; callers treat that
    /// as a no-op tick rather than an error.
    pub fn parse_frame(text: &str) -> Option<Self> {
        let envelope: FeedEnvelope = serde_json::from_str(text).ok()?;
        if envelope.status != "success" {
            return None;
        }
        Some(Self::from_raw(envelope.data?))
    }

    /// Replaces one category's snapshot.
    pub fn set(&mut self, category: StockCategory, snapshot: CategorySnapshot) {
        self.snapshots.insert(category, snapshot);
    }

    /// Iterates categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&StockCategory, &CategorySnapshot)> {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_valid_payload() {
        let text = r#"{
            "status": "success",
            "data": {
                "gear": {"items": [{"name": "Hoe", "quantity": 2, "emoji": "⚒️"}], "countdown": "04:12"},
                "honey": {"items": [{"name": "Honey Comb", "quantity": 1}]},
                "travelingmerchant": {"items": [], "appearIn": "2h"}
            }
        }"#;

        let tick = FeedTick::parse_frame(text).expect("valid frame must parse");
        let categories: Vec<StockCategory> = tick.iter().map(|(c, _)| *c).collect();

        // 1. Every category is present, in display order, even when absent
        //    from the payload.
        assert_eq!(categories, StockCategory::ALL.to_vec());

        // 2. Parsed fields survive, including renamed ones.
        let gear = tick
            .iter()
            .find(|(c, _)| **c == StockCategory::Gear)
            .map(|(_, s)| s.clone())
            .unwrap();
        assert_eq!(gear.items[0].name, "Hoe");
        assert_eq!(gear.items[0].quantity, 2);
        assert_eq!(gear.countdown.as_deref(), Some("04:12"));

        let merchant = tick
            .iter()
            .find(|(c, _)| **c == StockCategory::TravelingMerchant)
            .map(|(_, s)| s.clone())
            .unwrap();
        assert_eq!(merchant.appear_in.as_deref(), Some("2h"));

        // 3. The honey key lands in the event category.
        let event = tick
            .iter()
            .find(|(c, _)| **c == StockCategory::Event)
            .map(|(_, s)| s.clone())
            .unwrap();
        assert_eq!(event.items[0].name, "Honey Comb");
    }

    #[test]
    fn test_parse_frame_rejects_noise() {
        // Control frames, partial envelopes, and junk all collapse to None.
        assert!(FeedTick::parse_frame("pong").is_none());
        assert!(FeedTick::parse_frame("{\"status\":\"error\"}").is_none());
        assert!(FeedTick::parse_frame("{\"status\":\"success\"}").is_none());
        assert!(FeedTick::parse_frame("{\"status\":\"keepalive\",\"data\":{}}").is_none());
        assert!(FeedTick::parse_frame("{not json").is_none());
    }

    #[test]
    fn test_active_items_excludes_zero_quantity() {
        let snapshot = CategorySnapshot {
            items: vec![
                StockItem {
                    name: "Hoe".into(),
                    quantity: 0,
                    emoji: None,
                },
                StockItem {
                    name: "Axe".into(),
                    quantity: 5,
                    emoji: None,
                },
            ],
            countdown: None,
            appear_in: None,
        };
        let active: Vec<&str> = snapshot.active_items().map(|i| i.name.as_str()).collect();
        assert_eq!(active, vec!["Axe"]);
    }

    #[test]
    fn test_category_token_parsing() {
        assert_eq!(StockCategory::parse(" Gear "), Some(StockCategory::Gear));
        assert_eq!(StockCategory::parse("seeds"), Some(StockCategory::Seed));
        assert_eq!(StockCategory::parse("honey"), Some(StockCategory::Event));
        assert_eq!(
            StockCategory::parse("traveling-merchant"),
            Some(StockCategory::TravelingMerchant)
        );
        assert_eq!(StockCategory::parse("weather"), None);
    }
}
