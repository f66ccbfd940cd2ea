use serde::{Deserialize, Serialize};

/// Rendered message queued for delivery to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundNotification {
    pub subscriber_id: String,
    pub credential: String,
    pub text: String,
}

/// Body POSTed to the delivery endpoint for one notification.
#[derive(Debug, Serialize)]
pub struct DeliveryRequest<'a> {
    pub recipient_id: &'a str,
    pub text: &'a str,
}

/// Current in-game weather, fetched best-effort once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherReport {
    pub icon: String,
    #[serde(rename = "weatherType")]
    pub weather_type: String,
    pub description: String,
    #[serde(rename = "cropBonuses")]
    pub crop_bonuses: String,
}

/// Body for `POST /subscribers/{id}/track`.
#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub credential: String,
}

/// Body for `POST /subscribers/{id}/favorites`.
#[derive(Debug, Deserialize)]
pub struct FavoritesRequest {
    pub action: FavoritesAction,
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoritesAction {
    Add,
    Remove,
}

/// Uniform reply body for subscriber-facing operations.
#[derive(Debug, Serialize)]
pub struct OpsReply {
    pub message: String,
}
