use halalguard::audit::{AggregateStatistics, AuditReport, SessionView};
use halalguard::monitor::MonitorState;
use halalguard::notify::Notification;

pub(crate) fn render_view(view: &SessionView) {
    println!("Analysis results");
    if let Some(error) = &view.error {
        println!("- Error: {error}");
    }
    for combined in &view.results {
        match &combined.analysis {
            Some(analysis) => {
                println!(
                    "- {} | {} | {} | {} | score {:.0}",
                    combined.record.id,
                    combined.record.description,
                    analysis.status.label(),
                    analysis.violation_type.label(),
                    analysis.confidence_score
                );
                println!("  Reasoning: {}", analysis.reasoning);
                if let Some(correction) = &analysis.suggested_correction {
                    println!("  Suggested correction: {correction}");
                }
                if let Some(maslahah) = &analysis.maslahah_analysis {
                    println!(
                        "  Maslahah: {:.0} ({})",
                        maslahah.total_score, maslahah.long_term_projection
                    );
                }
            }
            None => {
                println!(
                    "- {} | {} | pending",
                    combined.record.id, combined.record.description
                );
            }
        }
    }
}

pub(crate) fn render_statistics(stats: &AggregateStatistics) {
    println!("\nCompliance summary");
    println!(
        "- {} analyzed: {} compliant, {} non-compliant, {} need review",
        stats.total, stats.compliant, stats.non_compliant, stats.review
    );
    println!(
        "- Violations: {} riba, {} gharar, {} maysir, {} syubhat ({} halal)",
        stats.riba_count, stats.gharar_count, stats.maysir_count, stats.syubhat_count,
        stats.halal_count
    );
    println!("- Average confidence score: {}%", stats.avg_score);

    if !stats.radar.is_empty() {
        println!("\nCompliance dimensions");
        for dimension in &stats.radar {
            println!("- {}: {}%", dimension.label, dimension.value);
        }
    }

    if !stats.maslahah_bars.is_empty() {
        println!(
            "\nMaslahah impact (avg {})",
            stats.avg_maslahah_score
        );
        for bar in &stats.maslahah_bars {
            println!("- {}: {}", bar.label, bar.value);
        }
    }
}

pub(crate) fn render_report(report: &AuditReport) {
    println!("\nFormal audit report");
    println!(
        "- {} transactions | {} analyzed | {} open findings | {} compliant",
        report.total, report.analyzed, report.violations, report.compliant
    );
    if report.findings.is_empty() {
        println!("- Findings: none");
        return;
    }
    println!("- Findings:");
    for finding in &report.findings {
        let violation = finding.violation.unwrap_or("pending");
        let score = finding
            .confidence_score
            .map(|score| format!("{score:.0}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  - {} | {} | {} | amount {:.2} | score {}",
            finding.id, finding.description, violation, finding.amount, score
        );
        if let Some(correction) = &finding.suggested_correction {
            println!("    Correction: {correction}");
        }
    }
}

pub(crate) fn render_monitor(state: &MonitorState) {
    match &state.snapshot {
        Some(snapshot) => {
            println!(
                "Metrics: {} analyzed | avg confidence {:.1}%",
                snapshot.total_analyzed,
                halalguard::audit::normalize_score(snapshot.average_confidence)
            );
            for (status, count) in &snapshot.compliance_stats {
                println!("- {status}: {count}");
            }
        }
        None => println!("Metrics: no snapshot yet"),
    }

    if let Some(latest) = state.samples.back() {
        println!(
            "Health: {} samples | latest {} ms, {:.1}% accuracy at {}",
            state.samples.len(),
            latest.latency_ms,
            latest.accuracy,
            latest.time
        );
    }

    for line in &state.activity_log {
        println!("  {line}");
    }
}

pub(crate) fn render_notification(notification: &Notification) {
    println!("[{:?}] {}", notification.kind, notification.content);
}
