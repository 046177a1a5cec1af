use crate::audit::aggregate::{aggregate, normalize_score, report};
use crate::audit::domain::{
    CombinedResult, ComplianceBreakdown, ComplianceStatus, ViolationType,
};

use super::common::{record, result, with_breakdown, with_maslahah};

#[test]
fn empty_set_yields_zeroed_statistics() {
    let stats = aggregate(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.avg_score, 0);
    assert_eq!(stats.avg_maslahah_score, 0);
    assert!(stats.radar.is_empty());
    assert!(stats.maslahah_bars.is_empty());
}

#[test]
fn counts_partition_by_status_and_violation() {
    let results = vec![
        result("TXN-1", ComplianceStatus::Compliant, ViolationType::Halal, 95.0),
        result("TXN-2", ComplianceStatus::NonCompliant, ViolationType::Riba, 20.0),
        result("TXN-3", ComplianceStatus::NonCompliant, ViolationType::Maysir, 35.0),
        result("TXN-4", ComplianceStatus::NeedsReview, ViolationType::Syubhat, 60.0),
    ];

    let stats = aggregate(&results);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.compliant, 1);
    assert_eq!(stats.non_compliant, 2);
    assert_eq!(stats.review, 1);
    assert_eq!(
        stats.compliant + stats.non_compliant + stats.review,
        stats.total
    );
    assert_eq!(stats.riba_count, 1);
    assert_eq!(stats.maysir_count, 1);
    assert_eq!(stats.halal_count, 1);
    assert_eq!(stats.syubhat_count, 1);
    assert_eq!(stats.gharar_count, 0);
    // (95 + 20 + 35 + 60) / 4 = 52.5, rounded
    assert_eq!(stats.avg_score, 53);
}

#[test]
fn breakdownless_results_dilute_the_radar_mean() {
    let full = ComplianceBreakdown {
        riba_score: 1.0,
        gharar_score: 1.0,
        maysir_score: 1.0,
        halal_score: 1.0,
        justice_score: 1.0,
    };
    let results = vec![
        with_breakdown(
            result("TXN-1", ComplianceStatus::Compliant, ViolationType::Halal, 95.0),
            full,
        ),
        // No breakdown: contributes zero to every dimension sum but still
        // counts in the divisor.
        result("TXN-2", ComplianceStatus::NeedsReview, ViolationType::Syubhat, 60.0),
    ];

    let stats = aggregate(&results);
    assert_eq!(stats.radar.len(), 5);
    for dimension in &stats.radar {
        assert_eq!(dimension.value, 50, "dimension {}", dimension.label);
    }
    assert_eq!(stats.radar[0].label, "Riba");
    assert_eq!(stats.radar[4].label, "Keadilan");
}

#[test]
fn maslahah_bars_average_over_all_results() {
    let results = vec![
        with_maslahah(
            result("TXN-1", ComplianceStatus::Compliant, ViolationType::Halal, 90.0),
            80.0,
        ),
        with_maslahah(
            result("TXN-2", ComplianceStatus::Compliant, ViolationType::Halal, 85.0),
            60.0,
        ),
    ];

    let stats = aggregate(&results);
    assert_eq!(stats.avg_maslahah_score, 70);
    assert_eq!(stats.maslahah_bars.len(), 5);
    for bar in &stats.maslahah_bars {
        assert_eq!(bar.value, 70, "bar {}", bar.label);
    }
}

#[test]
fn fraction_and_percent_scores_normalize_equally() {
    assert_eq!(normalize_score(0.73), 73.0);
    assert_eq!(normalize_score(73.0), 73.0);
    assert_eq!(normalize_score(1.0), 100.0);
    assert_eq!(normalize_score(0.0), 0.0);
}

#[test]
fn report_counts_pending_records_as_open_findings() {
    let results = vec![
        CombinedResult {
            record: record("TXN-1", "Jual beli kurma", 500.0),
            analysis: Some(result(
                "TXN-1",
                ComplianceStatus::Compliant,
                ViolationType::Halal,
                95.0,
            )),
        },
        CombinedResult {
            record: record("TXN-2", "Bunga deposito", 120.0),
            analysis: Some(result(
                "TXN-2",
                ComplianceStatus::NonCompliant,
                ViolationType::Riba,
                15.0,
            )),
        },
        CombinedResult::pending(record("TXN-3", "Belum dianalisis", 40.0)),
    ];

    let view = report(&results);
    assert_eq!(view.total, 3);
    assert_eq!(view.analyzed, 2);
    assert_eq!(view.violations, 2);
    assert_eq!(view.compliant, 1);

    let ids: Vec<&str> = view.findings.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["TXN-2", "TXN-3"]);
    assert_eq!(view.findings[0].violation, Some("Riba"));
    assert_eq!(view.findings[1].violation, None);
    assert_eq!(view.findings[1].confidence_score, None);
}
