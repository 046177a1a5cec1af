use std::sync::Arc;

use chrono::Local;
use clap::Args;
use tracing::info;

use halalguard::client::ApiClient;
use halalguard::config::{AppConfig, MonitorMode};
use halalguard::error::AppError;
use halalguard::monitor::{
    MetricsPoller, PollerHandle, RemoteMetricsProvider, SimulatedMetricsProvider,
};
use halalguard::notify::{NoticeBoard, NotificationChannel};

use crate::render::{render_monitor, render_notification};

#[derive(Args, Debug, Default)]
pub(crate) struct WatchArgs {
    /// Use the simulated metrics source instead of the configured one
    #[arg(long)]
    pub(crate) simulated: bool,
    /// Dump each metrics snapshot as JSON instead of the summary view
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_watch(args: WatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    halalguard::telemetry::init(&config.telemetry)?;

    let mode = if args.simulated {
        MonitorMode::Simulated
    } else {
        config.monitor.mode
    };

    let poller = spawn_poller(&config, mode);
    info!(?mode, interval = ?config.monitor.poll_interval, "metrics poller started");

    let board = Arc::new(NoticeBoard::new());
    let channel = NotificationChannel::spawn(config.socket.url.clone(), Arc::clone(&board));
    info!(url = %config.socket.url, "notification listener started");

    let mut refresh = tokio::time::interval(config.monitor.poll_interval);
    let mut last_shown = None;
    loop {
        tokio::select! {
            _ = refresh.tick() => {
                let state = poller.view().await;
                println!("\n--- {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));
                if args.json {
                    match &state.snapshot {
                        Some(snapshot) => match serde_json::to_string_pretty(snapshot) {
                            Ok(json) => println!("{json}"),
                            Err(err) => println!("snapshot unavailable: {err}"),
                        },
                        None => println!("no snapshot yet"),
                    }
                } else {
                    render_monitor(&state);
                }

                let visible = board.current();
                if visible != last_shown {
                    if let Some(notification) = &visible {
                        render_notification(notification);
                    }
                    last_shown = visible;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping...");
                break;
            }
        }
    }

    channel.shutdown().await;
    poller.shutdown().await;
    Ok(())
}

fn spawn_poller(config: &AppConfig, mode: MonitorMode) -> PollerHandle {
    let window = config.monitor.window;
    let period = config.monitor.poll_interval;
    match mode {
        MonitorMode::Remote => {
            let provider = RemoteMetricsProvider::new(ApiClient::from_config(&config.api));
            MetricsPoller::spawn(provider, period, window)
        }
        MonitorMode::Simulated => {
            MetricsPoller::spawn(SimulatedMetricsProvider::new(), period, window)
        }
    }
}
