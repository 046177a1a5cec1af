use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::domain::{AnalysisResult, CombinedResult, TransactionRecord};

/// Failure surfaced by an analysis submit. The working set stays in its
/// reset-to-pending state when one of these occurs; no partial merge.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis service unreachable: {0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { message: String },
    #[error("analysis response could not be decoded: {0}")]
    Decode(String),
}

/// Boundary to the remote classification service, so the session can be
/// exercised against a mock in tests. One call per submit, no retries.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        records: &[TransactionRecord],
    ) -> Result<Vec<AnalysisResult>, AnalysisError>;
}

/// Read-only snapshot of the session for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub results: Vec<CombinedResult>,
    pub busy: bool,
    pub error: Option<String>,
}

impl SessionView {
    /// The analyzed subset, in working-set order, for the aggregate views.
    pub fn analyzed(&self) -> Vec<AnalysisResult> {
        self.results
            .iter()
            .filter_map(|combined| combined.analysis.clone())
            .collect()
    }
}

struct SessionState {
    results: Vec<CombinedResult>,
    busy: bool,
    error: Option<String>,
}

/// Owns the current working set of records and reconciles batch analysis
/// responses onto it.
///
/// Each submit carries a monotonically increasing tag; a completion whose
/// tag is no longer the latest is discarded rather than overwriting state
/// established by a newer submit. The merge always applies to the exact
/// record list passed to that submit, never to whatever the working set has
/// become since.
pub struct AnalysisSession<B> {
    backend: Arc<B>,
    state: Mutex<SessionState>,
    submissions: AtomicU64,
}

impl<B> AnalysisSession<B>
where
    B: AnalysisBackend,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState {
                results: Vec::new(),
                busy: false,
                error: None,
            }),
            submissions: AtomicU64::new(0),
        }
    }

    /// Submit a batch for analysis and merge the response.
    ///
    /// The visible set is immediately reset to `records`, all pending, so a
    /// re-analysis visibly discards stale results before new ones arrive.
    /// On success the response is left-joined onto the submitted list by
    /// `id == transaction_id`, preserving record order; unmatched records
    /// keep `analysis: None` silently. On failure the pending set stays in
    /// place and the error message is recorded. Returns the resulting view.
    pub async fn submit(&self, records: Vec<TransactionRecord>) -> SessionView {
        let tag = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.lock_state();
            state.busy = true;
            state.error = None;
            state.results = records.iter().cloned().map(CombinedResult::pending).collect();
        }

        let outcome = self.backend.analyze(&records).await;

        let mut state = self.lock_state();
        if tag != self.submissions.load(Ordering::SeqCst) {
            // A newer submit owns the visible state now.
            debug!(tag, "discarding superseded analysis response");
            return snapshot(&state);
        }

        match outcome {
            Ok(results) => {
                state.results = merge_results(&records, &results);
            }
            Err(err) => {
                warn!(%err, "analysis submit failed");
                state.error = Some(err.to_string());
            }
        }
        state.busy = false;
        snapshot(&state)
    }

    /// Current view of the working set.
    pub fn view(&self) -> SessionView {
        snapshot(&self.lock_state())
    }

    /// Explicit user reset: drop the working set, error, and busy state.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.results.clear();
        state.error = None;
        state.busy = false;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session mutex poisoned")
    }
}

fn snapshot(state: &SessionState) -> SessionView {
    SessionView {
        results: state.results.clone(),
        busy: state.busy,
        error: state.error.clone(),
    }
}

/// Left-join results onto records by `id == transaction_id`.
///
/// The merged list always has one entry per record, in record order. Extra
/// results with no matching record are dropped; records with no matching
/// result come through with `analysis: None`.
pub fn merge_results(
    records: &[TransactionRecord],
    results: &[AnalysisResult],
) -> Vec<CombinedResult> {
    records
        .iter()
        .map(|record| CombinedResult {
            analysis: results
                .iter()
                .find(|result| result.transaction_id == record.id)
                .cloned(),
            record: record.clone(),
        })
        .collect()
}
