use serde::Serialize;

use super::domain::{AnalysisResult, CombinedResult, ComplianceStatus, ViolationType};

/// One labelled chart value in `[0, 100]`, radar- or bar-ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionScore {
    pub label: &'static str,
    pub value: u32,
}

/// Aggregate view over the analyzed working set. Entirely re-derived from
/// the current results on every call; there is no accumulator to keep in
/// sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub review: usize,
    pub riba_count: usize,
    pub gharar_count: usize,
    pub maysir_count: usize,
    pub halal_count: usize,
    pub syubhat_count: usize,
    /// Rounded mean confidence score, 0 on an empty set.
    pub avg_score: u32,
    /// Per-dimension compliance means, empty on an empty set.
    pub radar: Vec<DimensionScore>,
    pub avg_maslahah_score: u32,
    /// Per-dimension Maslahah means, empty on an empty set.
    pub maslahah_bars: Vec<DimensionScore>,
}

/// Compute aggregate statistics over analyzed results.
///
/// Per-dimension means divide by the total result count, not by the count
/// that carries a breakdown: a result without one dilutes the mean toward
/// zero. That is the contracted behavior, not an oversight.
pub fn aggregate(results: &[AnalysisResult]) -> AggregateStatistics {
    let total = results.len();

    let count_status = |status: ComplianceStatus| {
        results.iter().filter(|r| r.status == status).count()
    };
    let count_violation = |violation: ViolationType| {
        results.iter().filter(|r| r.violation_type == violation).count()
    };

    let avg_score = if total > 0 {
        let sum: f64 = results.iter().map(|r| r.confidence_score).sum();
        (sum / total as f64).round() as u32
    } else {
        0
    };

    let mut breakdown_sums = [0.0f64; 5];
    for result in results {
        if let Some(breakdown) = &result.breakdown {
            breakdown_sums[0] += breakdown.riba_score;
            breakdown_sums[1] += breakdown.gharar_score;
            breakdown_sums[2] += breakdown.maysir_score;
            breakdown_sums[3] += breakdown.halal_score;
            breakdown_sums[4] += breakdown.justice_score;
        }
    }

    let radar = if total > 0 {
        let labels = ["Riba", "Gharar", "Maysir", "Halal", "Keadilan"];
        labels
            .into_iter()
            .zip(breakdown_sums)
            .map(|(label, sum)| DimensionScore {
                label,
                value: (sum / total as f64 * 100.0).round() as u32,
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut maslahah_sums = [0.0f64; 5];
    let mut maslahah_total = 0.0f64;
    for result in results {
        if let Some(maslahah) = &result.maslahah_analysis {
            maslahah_sums[0] += maslahah.breakdown.economic_justice;
            maslahah_sums[1] += maslahah.breakdown.community_development;
            maslahah_sums[2] += maslahah.breakdown.educational_impact;
            maslahah_sums[3] += maslahah.breakdown.environmental;
            maslahah_sums[4] += maslahah.breakdown.social_cohesion;
            maslahah_total += maslahah.total_score;
        }
    }

    let avg_maslahah_score = if total > 0 {
        (maslahah_total / total as f64).round() as u32
    } else {
        0
    };

    let maslahah_bars = if total > 0 {
        let labels = [
            "Keadilan Eko.",
            "Komunitas",
            "Pendidikan",
            "Lingkungan",
            "Kohesi Sosial",
        ];
        labels
            .into_iter()
            .zip(maslahah_sums)
            .map(|(label, sum)| DimensionScore {
                label,
                value: (sum / total as f64).round() as u32,
            })
            .collect()
    } else {
        Vec::new()
    };

    AggregateStatistics {
        total,
        compliant: count_status(ComplianceStatus::Compliant),
        non_compliant: count_status(ComplianceStatus::NonCompliant),
        review: count_status(ComplianceStatus::NeedsReview),
        riba_count: count_violation(ViolationType::Riba),
        gharar_count: count_violation(ViolationType::Gharar),
        maysir_count: count_violation(ViolationType::Maysir),
        halal_count: count_violation(ViolationType::Halal),
        syubhat_count: count_violation(ViolationType::Syubhat),
        avg_score,
        radar,
        avg_maslahah_score,
        maslahah_bars,
    }
}

/// Resolve a score that may arrive as a fraction or a percentage into a
/// displayed percentage: values above 1 are taken as already-percent, values
/// at or below 1 are scaled by 100. Input ranges are not contractually
/// fixed, so this heuristic must hold exactly.
pub fn normalize_score(value: f64) -> f64 {
    if value > 1.0 {
        value
    } else {
        value * 100.0
    }
}

/// One row of the formal audit report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub violation: Option<&'static str>,
    pub confidence_score: Option<f64>,
    pub suggested_correction: Option<String>,
}

/// Summary backing the printable audit report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub total: usize,
    pub analyzed: usize,
    pub violations: usize,
    pub compliant: usize,
    pub findings: Vec<Finding>,
}

/// Build the formal report view over the full working set.
///
/// A record counts as a finding unless its analysis says compliant, so a
/// still-pending record shows up as an open finding rather than a pass.
pub fn report(results: &[CombinedResult]) -> AuditReport {
    let findings: Vec<Finding> = results
        .iter()
        .filter(|combined| {
            combined
                .analysis
                .as_ref()
                .map_or(true, |analysis| analysis.status != ComplianceStatus::Compliant)
        })
        .map(|combined| Finding {
            id: combined.record.id.clone(),
            description: combined.record.description.clone(),
            amount: combined.record.amount,
            date: combined.record.date.clone(),
            violation: combined
                .analysis
                .as_ref()
                .map(|analysis| analysis.violation_type.label()),
            confidence_score: combined.analysis.as_ref().map(|a| a.confidence_score),
            suggested_correction: combined
                .analysis
                .as_ref()
                .and_then(|analysis| analysis.suggested_correction.clone()),
        })
        .collect();

    AuditReport {
        total: results.len(),
        analyzed: results.iter().filter(|c| c.analysis.is_some()).count(),
        violations: findings.len(),
        compliant: results.len() - findings.len(),
        findings,
    }
}
