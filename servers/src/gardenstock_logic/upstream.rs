use crate::gardenstock_logic::config::Config;
use crate::gardenstock_logic::dispatch;
use crate::gardenstock_logic::model::OutboundNotification;
use crate::gardenstock_logic::state::AppState;
use crate::gardenstock_logic::weather::WeatherWatch;
use futures_util::{SinkExt, StreamExt};
use lib_common::stock::model::FeedTick;
use lib_common::utils::timetools;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, sleep};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};

/// Owns the single upstream feed connection for the whole process.
///
/// One task runs this loop and everything downstream shares its output, so
/// "at most one connection" holds by construction. Any close or transport
/// error tears the connection down and schedules exactly one reconnect
/// after a fixed delay, forever; a dead upstream degrades to a gap in
/// updates rather than an error any subscriber sees.
pub async fn run(
    config: Config,
    state: AppState,
    outbound: mpsc::UnboundedSender<OutboundNotification>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let weather = WeatherWatch::new(&config);
    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);

    loop {
        if shutdown.try_recv().is_ok() {
            break;
        }

        log::info!("Connecting to stock feed: {}", config.feed_url);

        match connect_async(config.feed_url.as_str()).await {
            Ok((ws_stream, _)) => {
                log::info!("Connected to stock feed.");
                let (mut write, mut read) = ws_stream.split();

                let mut heartbeat = interval(Duration::from_secs(config.heartbeat_seconds));
                // The first interval tick fires immediately; the feed does
                // not need a ping at connect time.
                heartbeat.tick().await;

                loop {
                    tokio::select! {
                        _ = shutdown.recv() => {
                            log::info!("Upstream shutting down...");
                            let _ = write.close().await;
                            return;
                        }
                        _ = heartbeat.tick() => {
                            if let Err(e) = write.send(WsMessage::Text("ping".into())).await {
                                log::warn!("Heartbeat failed: {}", e);
                                break; // Reconnect
                            }
                        }
                        frame = read.next() => {
                            match frame {
                                Some(Ok(WsMessage::Text(text))) => {
                                    handle_frame(text.as_str(), &state, &weather, &outbound).await;
                                }
                                Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
                                Some(Ok(WsMessage::Close(_))) => {
                                    log::warn!("Feed closed the connection.");
                                    break;
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    log::warn!("Feed read error: {}", e);
                                    break;
                                }
                                None => {
                                    log::warn!("Feed stream ended.");
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("Failed to connect to stock feed: {}", e);
            }
        }

        // Same fixed delay after a failed connect and after a drop.
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = sleep(reconnect_delay) => {}
        }
    }
}

/// Processes one inbound text frame to completion. Control frames,
/// non-success envelopes, and malformed payloads are no-op ticks; a valid
/// snapshot updates the last-seen index and fans out to every subscriber
/// before the next frame is handled.
pub async fn handle_frame(
    text: &str,
    state: &AppState,
    weather: &WeatherWatch,
    outbound: &mpsc::UnboundedSender<OutboundNotification>,
) {
    let Some(tick) = FeedTick::parse_frame(text) else {
        log::debug!("Ignoring non-data feed frame");
        return;
    };

    let now = timetools::manila_now();
    state.record_tick(&tick, now).await;

    if !state.has_active_sessions().await {
        return;
    }
    let report = weather.fetch().await;
    dispatch::run_tick(state, &tick, report.as_ref(), now, outbound).await;
}
