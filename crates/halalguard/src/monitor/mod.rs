//! Metrics refresh loop for the monitoring view.
//!
//! A [`MetricsPoller`] task asks its [`MetricsProvider`] for one observation
//! per tick and folds it into shared state: the latest snapshot replaces the
//! previous one wholesale, while health samples accumulate in a rolling
//! window. A failed poll is logged and skipped; the last good state stays on
//! display until a later tick succeeds.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ApiClient, ClientError};

/// System-level counters reported by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub total_analyzed: u64,
    #[serde(default)]
    pub average_confidence: f64,
    #[serde(default)]
    pub compliance_stats: BTreeMap<String, u64>,
    #[serde(default)]
    pub bias_check_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub sanitization_version_stats: BTreeMap<String, u64>,
}

/// One point on the health time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSample {
    /// Wall-clock label, `HH:MM:SS`.
    pub time: String,
    pub latency_ms: u64,
    pub accuracy: f64,
}

/// One successful poll: the fresh snapshot, a derived health sample, and an
/// optional activity-log line.
#[derive(Debug, Clone)]
pub struct Observation {
    pub snapshot: MetricsSnapshot,
    pub sample: HealthSample,
    pub log_line: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ObservationError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("metrics source unavailable: {0}")]
    Unavailable(String),
}

/// Source of monitoring observations. The remote provider is the canonical
/// one; the simulated provider exists for demos and offline work.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn observe(&self) -> Result<Observation, ObservationError>;

    /// Samples to pre-fill the rolling window with before the first tick.
    fn seed(&self, _window: usize) -> Vec<HealthSample> {
        Vec::new()
    }
}

fn clock_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Polls the real `/metrics` endpoint. Latency is the measured round-trip of
/// the fetch itself; accuracy is the reported mean confidence as a
/// percentage.
pub struct RemoteMetricsProvider {
    client: ApiClient,
}

impl RemoteMetricsProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsProvider for RemoteMetricsProvider {
    async fn observe(&self) -> Result<Observation, ObservationError> {
        let started = tokio::time::Instant::now();
        let snapshot = self.client.system_metrics().await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let sample = HealthSample {
            time: clock_label(),
            latency_ms,
            accuracy: crate::audit::normalize_score(snapshot.average_confidence),
        };

        Ok(Observation {
            snapshot,
            sample,
            log_line: None,
        })
    }
}

const SIMULATED_LOG_LINES: [&str; 5] = [
    "Analisis transaksi selesai",
    "Sinkronisasi data berhasil",
    "Pemeriksaan bias model berjalan",
    "Sanitasi data masukan selesai",
    "Koneksi layanan analisis stabil",
];

/// Generates plausible metrics locally, no network involved. The window is
/// pre-seeded so charts start full instead of growing from empty.
pub struct SimulatedMetricsProvider {
    ticks: AtomicU64,
}

impl SimulatedMetricsProvider {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
        }
    }

    fn sample(&self) -> HealthSample {
        let mut rng = rand::thread_rng();
        HealthSample {
            time: clock_label(),
            latency_ms: rng.gen_range(35..=65),
            accuracy: rng.gen_range(98.0..=100.0),
        }
    }
}

impl Default for SimulatedMetricsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsProvider for SimulatedMetricsProvider {
    async fn observe(&self) -> Result<Observation, ObservationError> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        let sample = self.sample();

        let mut compliance_stats = BTreeMap::new();
        compliance_stats.insert("Patuh".to_string(), 180 + tick * 2);
        compliance_stats.insert("Tidak Patuh".to_string(), 24 + tick / 3);
        compliance_stats.insert("Butuh Tinjauan".to_string(), 12 + tick / 5);

        let snapshot = MetricsSnapshot {
            total_analyzed: 216 + tick * 3,
            average_confidence: sample.accuracy / 100.0,
            compliance_stats,
            bias_check_status: BTreeMap::from([("passed".to_string(), 216 + tick * 3)]),
            sanitization_version_stats: BTreeMap::from([("v2".to_string(), 216 + tick * 3)]),
        };

        let line = SIMULATED_LOG_LINES[(tick as usize) % SIMULATED_LOG_LINES.len()];
        let log_line = Some(format!("[{}] {}", sample.time, line));
        Ok(Observation {
            snapshot,
            sample,
            log_line,
        })
    }

    fn seed(&self, window: usize) -> Vec<HealthSample> {
        (0..window).map(|_| self.sample()).collect()
    }
}

const ACTIVITY_LOG_CAP: usize = 5;

/// Everything the monitoring view renders, behind one lock.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub snapshot: Option<MetricsSnapshot>,
    pub samples: VecDeque<HealthSample>,
    /// Newest first, at most [`ACTIVITY_LOG_CAP`] lines.
    pub activity_log: VecDeque<String>,
}

impl MonitorState {
    fn apply(&mut self, observation: Observation, window: usize) {
        self.snapshot = Some(observation.snapshot);
        self.samples.push_back(observation.sample);
        while self.samples.len() > window {
            self.samples.pop_front();
        }
        if let Some(line) = observation.log_line {
            self.activity_log.push_front(line);
            self.activity_log.truncate(ACTIVITY_LOG_CAP);
        }
    }
}

/// Handle to a running metrics loop. Dropping it does not stop the task;
/// call [`PollerHandle::stop`] or [`PollerHandle::shutdown`].
pub struct PollerHandle {
    state: Arc<RwLock<MonitorState>>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Current rendered state, cloned out from under the lock.
    pub async fn view(&self) -> MonitorState {
        self.state.read().await.clone()
    }

    /// Signal the loop to exit after its current tick. Safe to call more
    /// than once.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait for the task to finish.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}

pub struct MetricsPoller;

impl MetricsPoller {
    /// Start the refresh loop. The first poll happens immediately, then one
    /// per `period`.
    pub fn spawn<P>(provider: P, period: Duration, window: usize) -> PollerHandle
    where
        P: MetricsProvider + 'static,
    {
        let mut state = MonitorState::default();
        state.samples.extend(provider.seed(window));
        while state.samples.len() > window {
            state.samples.pop_front();
        }

        let state = Arc::new(RwLock::new(state));
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                // Stop takes priority over a tick that became due at the
                // same instant.
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            debug!("metrics poller stopping");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        match provider.observe().await {
                            Ok(observation) => {
                                task_state.write().await.apply(observation, window);
                            }
                            Err(err) => {
                                warn!(error = %err, "metrics poll failed, keeping last state");
                            }
                        }
                    }
                }
            }
        });

        PollerHandle {
            state,
            stop_tx,
            task,
        }
    }
}
