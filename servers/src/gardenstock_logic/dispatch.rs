use crate::gardenstock_logic::model::{OutboundNotification, WeatherReport};
use crate::gardenstock_logic::state::AppState;
use chrono::DateTime;
use chrono_tz::Tz;
use lib_common::stock::format::{clean_name, format_items};
use lib_common::stock::model::{CategorySnapshot, FeedTick, StockCategory, StockItem};
use lib_common::utils::timetools;
use std::collections::BTreeSet;
use tokio::sync::mpsc;

/// Value-compared summary of one rendered message. Two consecutive sends
/// to the same subscriber with equal digests collapse into one.
///
/// The rendered timestamp is deliberately part of the digest: a fresh tick
/// re-sends even when the shop contents did not change, so subscribers
/// always see the latest update time. Dedup therefore only collapses
/// retransmissions of the very same tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDigest {
    pub title: String,
    pub sections: Vec<String>,
    pub weather: String,
    pub updated_at: String,
}

/// Outcome of filtering one category for one subscriber.
struct CategorySection {
    matched: usize,
    text: String,
}

/// Applies the active-quantity and favorites filters to one category and
/// renders its section. Returns `None` when the category contributes
/// nothing for this subscriber.
fn filter_category(
    category: StockCategory,
    snapshot: &CategorySnapshot,
    favorites: &BTreeSet<String>,
) -> Option<CategorySection> {
    let active: Vec<&StockItem> = snapshot.active_items().collect();
    if active.is_empty() {
        return None;
    }

    let matched: Vec<&StockItem> = if favorites.is_empty() {
        active
    } else {
        active
            .into_iter()
            .filter(|i| favorites.contains(clean_name(&i.name).as_str()))
            .collect()
    };
    if matched.is_empty() {
        return None;
    }

    let mut text = format!(
        "{}:\n{}",
        category.label(),
        format_items(matched.iter().copied(), category.uses_emoji())
    );

    // The merchant announces an arrival window instead of a countdown.
    let restock = snapshot.countdown.as_deref().or_else(|| {
        if category == StockCategory::TravelingMerchant {
            snapshot.appear_in.as_deref()
        } else {
            None
        }
    });
    if let Some(label) = restock {
        text.push_str(&format!("\n⏳ Restock In: {}", label));
    }

    Some(CategorySection {
        matched: matched.len(),
        text,
    })
}

/// Builds the digest for one subscriber, or `None` when the tick holds
/// nothing relevant for them (no send, no digest update).
pub fn build_digest(
    tick: &FeedTick,
    favorites: &BTreeSet<String>,
    weather: Option<&WeatherReport>,
    now: DateTime<Tz>,
) -> Option<RenderedDigest> {
    let mut sections = Vec::new();
    let mut match_count = 0usize;
    for (category, snapshot) in tick.iter() {
        if let Some(section) = filter_category(*category, snapshot, favorites) {
            match_count += section.matched;
            sections.push(section.text);
        }
    }

    if !favorites.is_empty() && match_count == 0 {
        return None;
    }
    if sections.is_empty() {
        return None;
    }

    let title = if favorites.is_empty() {
        "🌾 Grow A Garden Tracker".to_string()
    } else {
        format!(
            "♥️ {} Favorite item{} Found!",
            match_count,
            if match_count > 1 { "s" } else { "" }
        )
    };

    let weather_text = weather
        .map(|w| {
            format!(
                "🌤️ Weather: {} {}\n📋 {}\n🎯 {}\n",
                w.icon, w.weather_type, w.description, w.crop_bonuses
            )
        })
        .unwrap_or_default();

    Some(RenderedDigest {
        title,
        sections,
        weather: weather_text,
        updated_at: timetools::stamp(now),
    })
}

/// Final message text for one digest.
pub fn render_message(digest: &RenderedDigest) -> String {
    format!(
        "{}\n\n{}\n\n{}📅 Updated at (PH): {}",
        digest.title,
        digest.sections.join("\n\n"),
        digest.weather,
        digest.updated_at
    )
}

/// Fans one tick out to every active subscriber. Each subscriber is
/// filtered, rendered, and deduplicated independently; a send failure only
/// means the delivery side is gone.
pub async fn run_tick(
    state: &AppState,
    tick: &FeedTick,
    weather: Option<&WeatherReport>,
    now: DateTime<Tz>,
    outbound: &mpsc::UnboundedSender<OutboundNotification>,
) {
    for (subscriber_id, credential) in state.session_snapshot().await {
        let favorites = state.favorites_of(&subscriber_id).await;
        let Some(digest) = build_digest(tick, &favorites, weather, now) else {
            continue;
        };
        if !state.update_digest(&subscriber_id, &digest).await {
            continue;
        }
        let text = render_message(&digest);
        if outbound
            .send(OutboundNotification {
                subscriber_id,
                credential,
                text,
            })
            .is_err()
        {
            log::warn!("Delivery channel closed; dropping notification");
        }
    }
}
