//! Display formatting for stock items and quantities. Pure functions over
//! the wire model; no clock, no state.

use super::model::StockItem;

/// Compact quantity rendering: `x999`, `x1.5K`, `x2.5M`.
pub fn format_value(val: u64) -> String {
    if val >= 1_000_000 {
        format!("x{:.1}M", val as f64 / 1_000_000.0)
    } else if val >= 1_000 {
        format!("x{:.1}K", val as f64 / 1_000.0)
    } else {
        format!("x{}", val)
    }
}

/// One bullet line for a single item.
pub fn item_line(item: &StockItem, use_emoji: bool) -> String {
    match (&item.emoji, use_emoji) {
        (Some(emoji), true) => {
            format!("- {} {}: {}", emoji, item.name, format_value(item.quantity))
        }
        _ => format!("- {}: {}", item.name, format_value(item.quantity)),
    }
}

/// Renders a block of item lines. Zero-quantity items are never shown.
pub fn format_items<'a, I>(items: I, use_emoji: bool) -> String
where
    I: IntoIterator<Item = &'a StockItem>,
{
    items
        .into_iter()
        .filter(|i| i.quantity > 0)
        .map(|i| item_line(i, use_emoji))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonical form used for favorites matching: trimmed and case-folded.
pub fn clean_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: u64, emoji: Option<&str>) -> StockItem {
        StockItem {
            name: name.into(),
            quantity,
            emoji: emoji.map(|e| e.to_string()),
        }
    }

    #[test]
    fn test_format_value_buckets() {
        assert_eq!(format_value(0), "x0");
        assert_eq!(format_value(999), "x999");
        assert_eq!(format_value(1_000), "x1.0K");
        assert_eq!(format_value(1_500), "x1.5K");
        assert_eq!(format_value(999_999), "x1000.0K");
        assert_eq!(format_value(1_000_000), "x1.0M");
        assert_eq!(format_value(2_500_000), "x2.5M");
    }

    #[test]
    fn test_item_lines_respect_emoji_switch() {
        let with_emoji = item("Hoe", 2, Some("⚒️"));
        assert_eq!(item_line(&with_emoji, true), "- ⚒️ Hoe: x2");
        assert_eq!(item_line(&with_emoji, false), "- Hoe: x2");

        // No emoji on the item renders the plain form either way.
        let plain = item("Axe", 5, None);
        assert_eq!(item_line(&plain, true), "- Axe: x5");
    }

    #[test]
    fn test_format_items_skips_inactive() {
        let items = vec![
            item("Hoe", 2, None),
            item("Rake", 0, None),
            item("Axe", 1_500, None),
        ];
        assert_eq!(
            format_items(&items, false),
            "- Hoe: x2\n- Axe: x1.5K"
        );
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Watering Can "), "watering can");
        assert_eq!(clean_name("HOE"), "hoe");
        assert_eq!(clean_name("   "), "");
    }
}
