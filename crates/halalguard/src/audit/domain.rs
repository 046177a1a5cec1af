use serde::{Deserialize, Serialize};

/// Canonical transaction record as produced by intake or manual entry.
///
/// Identity (`id`) is stable once created; the orchestrator never mutates a
/// record, it only attaches analysis to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub description: String,
    pub amount: f64,
    /// Calendar date in `YYYY-MM-DD` form, kept as text end to end.
    pub date: String,
    /// Free-form category, e.g. "Expense", "Income", "Investment".
    #[serde(rename = "type")]
    pub kind: String,
}

/// Overall compliance verdict for a single transaction.
///
/// Serialized with the Indonesian labels the service emits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "Patuh")]
    Compliant,
    #[serde(rename = "Tidak Patuh")]
    NonCompliant,
    #[serde(rename = "Butuh Tinjauan")]
    NeedsReview,
}

impl ComplianceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Patuh",
            ComplianceStatus::NonCompliant => "Tidak Patuh",
            ComplianceStatus::NeedsReview => "Butuh Tinjauan",
        }
    }
}

/// Dominant violation category assigned by the service; `Halal` marks a
/// compliant transaction and `Syubhat` a doubtful one pending review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    Riba,
    Gharar,
    Maysir,
    Halal,
    Syubhat,
}

impl ViolationType {
    pub fn label(&self) -> &'static str {
        match self {
            ViolationType::Riba => "Riba",
            ViolationType::Gharar => "Gharar",
            ViolationType::Maysir => "Maysir",
            ViolationType::Halal => "Halal",
            ViolationType::Syubhat => "Syubhat",
        }
    }
}

/// Five fiqh sub-scores, each conceptually in `[0, 1]` where 1 is fully
/// compliant. The service computes `confidence_score` from these under the
/// declared weights; this side only displays them and never recomputes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceBreakdown {
    pub riba_score: f64,
    pub gharar_score: f64,
    pub maysir_score: f64,
    pub halal_score: f64,
    pub justice_score: f64,
}

impl ComplianceBreakdown {
    /// Declared display weights per dimension, in percent. Fixed by contract.
    pub const WEIGHTS: [(&'static str, u8); 5] = [
        ("Riba", 30),
        ("Gharar", 25),
        ("Maysir", 20),
        ("Halal", 15),
        ("Keadilan", 10),
    ];
}

/// Five social-impact sub-scores, each conceptually in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaslahahBreakdown {
    pub economic_justice: f64,
    pub community_development: f64,
    pub educational_impact: f64,
    pub environmental: f64,
    pub social_cohesion: f64,
}

impl MaslahahBreakdown {
    pub const WEIGHTS: [(&'static str, u8); 5] = [
        ("Keadilan Eko.", 30),
        ("Komunitas", 25),
        ("Pendidikan", 20),
        ("Lingkungan", 15),
        ("Kohesi Sosial", 10),
    ];
}

/// Maslahah (public-welfare) assessment attached to a result when the
/// service produced one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaslahahAnalysis {
    pub total_score: f64,
    pub breakdown: MaslahahBreakdown,
    pub long_term_projection: String,
}

/// Verdict returned by the remote classification service for one
/// transaction. Created only from the service response, never mutated once
/// attached to the working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub transaction_id: String,
    pub status: ComplianceStatus,
    pub violation_type: ViolationType,
    /// Overall weighted score in `[0, 100]`, trusted as supplied.
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ComplianceBreakdown>,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_correction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maslahah_analysis: Option<MaslahahAnalysis>,
    // Audit-trail fields the backend attaches after its sanitization and
    // bias-check passes. Read-only pass-through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_check_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sanitization_version: Option<String>,
}

/// A transaction record together with its analysis, once one has arrived.
/// `analysis` stays `None` for unmatched records and for the pending state
/// established at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    #[serde(flatten)]
    pub record: TransactionRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl CombinedResult {
    /// A record awaiting analysis, as reset at the start of every submit.
    pub fn pending(record: TransactionRecord) -> Self {
        Self {
            record,
            analysis: None,
        }
    }
}
