use anyhow::Result;
use tokio::signal;

mod gardenstock_logic;
use gardenstock_logic::{config, delivery, downstream, logger, state, upstream};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config();
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    let (outbound_tx, outbound_rx) = tokio::sync::mpsc::unbounded_channel();
    let app_state = state::AppState::new();

    let upstream_handle = tokio::spawn(upstream::run(
        config.clone(),
        app_state.clone(),
        outbound_tx,
        shutdown_tx.subscribe(),
    ));

    let delivery_handle = tokio::spawn(delivery::run(
        config.clone(),
        outbound_rx,
        shutdown_tx.subscribe(),
    ));

    let downstream_handle = tokio::spawn(downstream::run(
        config.clone(),
        app_state.clone(),
        shutdown_tx.subscribe(),
    ));

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut term_signal = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();
                term_signal.recv().await;
                log::info!("SIGTERM received, initiating shutdown.");
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }

    // Send shutdown signal to all components
    let _ = shutdown_tx.send(());

    // Wait for components to shut down
    let _ = tokio::try_join!(upstream_handle, delivery_handle, downstream_handle);

    log::info!("Shutdown complete.");
    Ok(())
}
