//! Shared fixtures for the audit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::audit::domain::{
    AnalysisResult, ComplianceBreakdown, ComplianceStatus, MaslahahAnalysis, MaslahahBreakdown,
    TransactionRecord, ViolationType,
};
use crate::audit::orchestrator::{AnalysisBackend, AnalysisError};

pub fn record(id: &str, description: &str, amount: f64) -> TransactionRecord {
    TransactionRecord {
        id: id.to_string(),
        description: description.to_string(),
        amount,
        date: "2024-06-01".to_string(),
        kind: "Expense".to_string(),
    }
}

pub fn result(
    transaction_id: &str,
    status: ComplianceStatus,
    violation: ViolationType,
    confidence_score: f64,
) -> AnalysisResult {
    AnalysisResult {
        transaction_id: transaction_id.to_string(),
        status,
        violation_type: violation,
        confidence_score,
        breakdown: None,
        reasoning: "Transaksi sesuai prinsip syariah".to_string(),
        suggested_correction: None,
        maslahah_analysis: None,
        bias_check_status: None,
        bias_log: None,
        data_sanitization_version: None,
    }
}

pub fn with_breakdown(mut base: AnalysisResult, breakdown: ComplianceBreakdown) -> AnalysisResult {
    base.breakdown = Some(breakdown);
    base
}

pub fn with_maslahah(mut base: AnalysisResult, total_score: f64) -> AnalysisResult {
    base.maslahah_analysis = Some(MaslahahAnalysis {
        total_score,
        breakdown: MaslahahBreakdown {
            economic_justice: total_score,
            community_development: total_score,
            educational_impact: total_score,
            environmental: total_score,
            social_cohesion: total_score,
        },
        long_term_projection: "Stabil".to_string(),
    });
    base
}

pub struct ScriptedCall {
    pub delay: Duration,
    pub outcome: Result<Vec<AnalysisResult>, AnalysisError>,
}

/// Backend stub with a queue of scripted responses, consumed one per call.
/// Delays let tests interleave overlapping submits under paused time.
pub struct MockBackend {
    script: Mutex<VecDeque<ScriptedCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_ok(&self, results: Vec<AnalysisResult>) {
        self.push(ScriptedCall {
            delay: Duration::ZERO,
            outcome: Ok(results),
        });
    }

    pub fn push_ok_after(&self, delay: Duration, results: Vec<AnalysisResult>) {
        self.push(ScriptedCall {
            delay,
            outcome: Ok(results),
        });
    }

    pub fn push_err(&self, error: AnalysisError) {
        self.push(ScriptedCall {
            delay: Duration::ZERO,
            outcome: Err(error),
        });
    }

    fn push(&self, call: ScriptedCall) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(call);
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn analyze(
        &self,
        _records: &[TransactionRecord],
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        let call = self
            .script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front()
            .expect("backend called with no scripted response left");
        if !call.delay.is_zero() {
            tokio::time::sleep(call.delay).await;
        }
        call.outcome
    }
}
