use crate::gardenstock_logic::config::Config;
use crate::gardenstock_logic::model::WeatherReport;
use lib_common::retrieve::json_client::JsonClient;
use std::time::Duration;

/// Best-effort weather lookup. Every failure mode collapses to `None`; a
/// missing annotation is the worst outcome a broken weather API can cause.
pub struct WeatherWatch {
    client: Option<JsonClient>,
    url: String,
}

impl WeatherWatch {
    pub fn new(config: &Config) -> Self {
        let client = if config.weather_url.is_empty() {
            None
        } else {
            JsonClient::new(Duration::from_secs(config.weather_timeout_seconds))
                .map_err(|e| log::warn!("Weather client unavailable: {}", e))
                .ok()
        };
        Self {
            client,
            url: config.weather_url.clone(),
        }
    }

    pub async fn fetch(&self) -> Option<WeatherReport> {
        let client = self.client.as_ref()?;
        match client.get_json::<WeatherReport>(&self.url).await {
            Ok(report) => Some(report),
            Err(e) => {
                log::debug!("Weather lookup failed: {}", e);
                None
            }
        }
    }
}
