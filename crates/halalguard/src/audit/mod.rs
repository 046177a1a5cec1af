//! Transaction intake, analysis orchestration, and aggregate statistics.
//!
//! The working set of [`CombinedResult`] values is owned exclusively by the
//! [`AnalysisSession`]; everything downstream (aggregation, report views)
//! consumes it read-only.

pub mod aggregate;
pub mod domain;
pub mod intake;
pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use aggregate::{
    aggregate, normalize_score, report, AggregateStatistics, AuditReport, DimensionScore, Finding,
};
pub use domain::{
    AnalysisResult, CombinedResult, ComplianceBreakdown, ComplianceStatus, MaslahahAnalysis,
    MaslahahBreakdown, TransactionRecord, ViolationType,
};
pub use intake::{parse_payload, validate_records, IntakeError, Worksheet};
pub use orchestrator::{
    merge_results, AnalysisBackend, AnalysisError, AnalysisSession, SessionView,
};
