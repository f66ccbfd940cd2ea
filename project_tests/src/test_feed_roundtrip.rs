//! # Feed Roundtrip Test Runner
//!
//! Drives the `lib_common` feed pipeline end-to-end against a loopback fake
//! feed: a local WebSocket server pushes snapshot frames exactly as the real
//! upstream would, and this runner connects, parses each frame into a tick,
//! feeds the last-seen index, and renders item lines. Everything runs
//! offline; no external endpoint is touched.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

use chrono::TimeZone;
use chrono_tz::Asia::Manila;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, connect_async, tungstenite::protocol::Message};

use lib_common::stock::format::format_items;
use lib_common::stock::lastseen::LastSeenIndex;
use lib_common::stock::model::{FeedTick, StockCategory};
use lib_common::utils::timetools;

const SNAPSHOT_FRAME: &str = r#"{
    "status": "success",
    "data": {
        "gear": {"items": [{"name": "Hoe", "quantity": 2, "emoji": "⚒️"}], "countdown": "04:12"},
        "seed": {"items": [{"name": "Carrot", "quantity": 0}, {"name": "Tomato", "quantity": 1500}]}
    }
}"#;

const NOISE_FRAME: &str = r#"{"status": "keepalive"}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("--- Starting Feed Roundtrip Tests ---");

    // 1. Stand up the fake feed on a random loopback port.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut ws = accept_async(stream).await.expect("handshake failed");
        ws.send(Message::Text(NOISE_FRAME.into()))
            .await
            .expect("send noise");
        ws.send(Message::Text(SNAPSHOT_FRAME.into()))
            .await
            .expect("send snapshot");
        let _ = ws.close(None).await;
    });

    // 2. Connect like the tracker does and collect text frames.
    println!("\n[Test 1] Connecting to the loopback feed...");
    let (ws_stream, _) = connect_async(format!("ws://127.0.0.1:{}", port)).await?;
    let (_write, mut read) = ws_stream.split();

    let mut ticks: Vec<FeedTick> = Vec::new();
    let mut frames = 0usize;
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                frames += 1;
                if let Some(tick) = FeedTick::parse_frame(text.as_str()) {
                    ticks.push(tick);
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    server.await?;

    // 3. The noise frame is dropped, the snapshot becomes exactly one tick.
    assert_eq!(frames, 2);
    assert_eq!(ticks.len(), 1);
    println!("✅ Parsed 1 tick out of {} frames", frames);

    // 4. Feed the last-seen index and verify the zero-quantity seed is
    //    not recorded while the active ones are.
    println!("\n[Test 2] Recording last-seen data...");
    let now = Manila.timestamp_opt(1_700_000_000, 0).unwrap();
    let mut index = LastSeenIndex::new();
    for (category, snapshot) in ticks[0].iter() {
        index.record(*category, &snapshot.items, now);
    }
    let seeds = index.entries(StockCategory::Seed);
    assert_eq!(seeds.len(), 1);
    assert_eq!(seeds[0].0, "Tomato");
    assert_eq!(index.entries(StockCategory::Gear).len(), 1);
    println!("✅ Last-seen entries: {:?}", seeds);

    // 5. Render the gear section the way a notification would.
    println!("\n[Test 3] Rendering item lines...");
    let gear = ticks[0]
        .iter()
        .find(|(c, _)| **c == StockCategory::Gear)
        .map(|(_, s)| s.clone())
        .expect("gear snapshot present");
    let lines = format_items(&gear.items, StockCategory::Gear.uses_emoji());
    assert_eq!(lines, "- ⚒️ Hoe: x2");
    println!("✅ Rendered: {}", lines);

    let later = Manila.timestamp_opt(1_700_000_000 + 90, 0).unwrap();
    println!("✅ Age rendering: {}", timetools::time_ago(now, later));

    println!("\n--- All Feed Roundtrip Tests Passed ---");
    Ok(())
}
