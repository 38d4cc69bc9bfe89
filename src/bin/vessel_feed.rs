//! Headless vessel feed client
//!
//! Subscribes to the configured feed, keeps the server informed of the
//! initial viewport and logs every fleet update and toast until Ctrl+C.
//!
//! Usage: `vessel_feed [config.yaml]`

use anyhow::Result;
use crossbeam_channel::Receiver;
use std::time::Duration;
use tracing::{info, warn};
use vessel_map_feed::bin_common::{load_config_from_env, parse_args, ConfigType};
use vessel_map_feed::vessel_feed::{
    init_tracing, ChannelNotifier, FeedConfig, ShutdownManager, Toast, VesselSubscription,
    ViewportPublisher,
};

/// How often queued toasts are flushed to the log
const TOAST_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config first (before logging is initialized)
    let config_type = match parse_args().into_iter().next() {
        Some(path) => ConfigType::Custom(path),
        None => ConfigType::Feed,
    };
    let config = FeedConfig::load(load_config_from_env(config_type))?;

    // Initialize logging with configured level
    init_tracing(&config.log_level);
    config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let (notifier, toasts) = ChannelNotifier::new();
    let subscription = VesselSubscription::from_config(&config, notifier)?;
    let publisher = ViewportPublisher::spawn(
        subscription.sender(),
        config.initial_viewport(),
        config.publish_interval(),
        config.debounce(),
    );

    print_banner(&config.endpoint);

    let mut fleet = subscription.latest_fixes();
    while shutdown.is_running() {
        tokio::select! {
            _ = shutdown.wait() => break,
            changed = fleet.changed() => {
                if changed.is_err() {
                    warn!("Feed stopped reconnecting, exiting");
                    break;
                }
                let snapshot = fleet.borrow_and_update().clone();
                info!("Fleet update: {} vessels", snapshot.len());
                for fix in &snapshot.fixes {
                    tracing::debug!(
                        "  {} at {:.5}, {:.5} heading {} sog {}",
                        fix.mmsi, fix.latitude, fix.longitude, fix.heading, fix.sog
                    );
                }
            }
            _ = tokio::time::sleep(TOAST_POLL_INTERVAL) => {}
        }
        log_toasts(&toasts);
    }

    publisher.shutdown().await;
    subscription.shutdown().await;
    log_toasts(&toasts);

    print_shutdown("Vessel feed");
    Ok(())
}

fn log_toasts(toasts: &Receiver<Toast>) {
    while let Ok(toast) = toasts.try_recv() {
        warn!("[{}] {}", toast.title, toast.body);
    }
}

fn print_banner(endpoint: &str) {
    info!("");
    info!("========================================");
    info!("Starting Vessel Feed");
    info!("Endpoint: {}", endpoint);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} stopped gracefully", name);
    info!("========================================");
}
