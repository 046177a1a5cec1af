use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Args;

use halalguard::audit::domain::{
    AnalysisResult, CombinedResult, ComplianceBreakdown, ComplianceStatus, MaslahahAnalysis,
    MaslahahBreakdown, TransactionRecord, ViolationType,
};
use halalguard::audit::{
    aggregate, parse_payload, report, validate_records, AnalysisBackend, AnalysisError,
    AnalysisSession, SessionView, Worksheet,
};
use halalguard::client::ApiClient;
use halalguard::config::AppConfig;
use halalguard::error::AppError;
use halalguard::monitor::{MetricsPoller, SimulatedMetricsProvider};
use halalguard::notify::{NoticeBoard, Notification, NotificationKind};

use crate::cli::AnalyzeArgs;
use crate::render::{
    render_monitor, render_notification, render_report, render_statistics, render_view,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the monitoring portion of the demo
    #[arg(long)]
    pub(crate) skip_monitor: bool,
}

/// Bundled sample ledger covering every verdict category.
fn sample_records() -> Vec<TransactionRecord> {
    let rows: [(&str, &str, f64, &str, &str); 7] = [
        (
            "TXN-001",
            "Pembayaran Bunga KPR Bulanan",
            1_200_000.0,
            "2023-10-01",
            "Expense",
        ),
        (
            "TXN-002",
            "Pembelian Emas Digital (Non-fisik/Spot)",
            5_000_000.0,
            "2023-10-02",
            "Investment",
        ),
        (
            "TXN-003",
            "Deposit Situs Judi Online",
            200_000.0,
            "2023-10-03",
            "Entertainment",
        ),
        (
            "TXN-004",
            "Belanja Bulanan Supermarket",
            1_500_000.0,
            "2023-10-04",
            "Expense",
        ),
        (
            "TXN-005",
            "Denda Keterlambatan Kartu Kredit",
            75_000.0,
            "2023-10-05",
            "Fee",
        ),
        (
            "TXN-006",
            "Premi Asuransi Jiwa Konvensional",
            300_000.0,
            "2023-10-06",
            "Insurance",
        ),
        (
            "TXN-007",
            "Bagi Hasil Kemitraan Usaha (Mudharabah)",
            1_200_000.0,
            "2023-10-07",
            "Income",
        ),
    ];

    rows.into_iter()
        .map(|(id, description, amount, date, kind)| TransactionRecord {
            id: id.to_string(),
            description: description.to_string(),
            amount,
            date: date.to_string(),
            kind: kind.to_string(),
        })
        .collect()
}

/// Offline stand-in for the analysis service: verdicts come from keyword
/// heuristics so the demo is deterministic and needs no network.
struct CannedBackend;

impl CannedBackend {
    fn verdict(record: &TransactionRecord) -> AnalysisResult {
        let description = record.description.to_lowercase();

        let (status, violation, score, reasoning, correction) = if description.contains("bunga")
            || description.contains("denda")
        {
            (
                ComplianceStatus::NonCompliant,
                ViolationType::Riba,
                12.0,
                "Tambahan atas pokok tanpa imbal jasa riil termasuk riba",
                Some("Alihkan ke pembiayaan murabahah atau musyarakah pada bank syariah"),
            )
        } else if description.contains("judi") {
            (
                ComplianceStatus::NonCompliant,
                ViolationType::Maysir,
                5.0,
                "Penempatan dana pada aktivitas perjudian termasuk maysir",
                Some("Tarik dana dan alihkan ke instrumen investasi syariah"),
            )
        } else if description.contains("konvensional") || description.contains("non-fisik") {
            (
                ComplianceStatus::NeedsReview,
                ViolationType::Gharar,
                45.0,
                "Akad tanpa serah terima aset riil mengandung ketidakpastian berlebihan",
                Some("Gunakan akad dengan aset fisik atau produk takaful syariah"),
            )
        } else {
            (
                ComplianceStatus::Compliant,
                ViolationType::Halal,
                94.0,
                "Transaksi sesuai prinsip muamalah syariah",
                None,
            )
        };

        let compliant = status == ComplianceStatus::Compliant;
        let base = score / 100.0;

        AnalysisResult {
            transaction_id: record.id.clone(),
            status,
            violation_type: violation,
            confidence_score: score,
            breakdown: Some(ComplianceBreakdown {
                riba_score: if violation == ViolationType::Riba { 0.1 } else { base.max(0.6) },
                gharar_score: if violation == ViolationType::Gharar { 0.3 } else { base.max(0.7) },
                maysir_score: if violation == ViolationType::Maysir { 0.0 } else { base.max(0.7) },
                halal_score: base.max(0.5),
                justice_score: base.max(0.6),
            }),
            reasoning: reasoning.to_string(),
            suggested_correction: correction.map(str::to_string),
            maslahah_analysis: compliant.then(|| MaslahahAnalysis {
                total_score: 78.0,
                breakdown: MaslahahBreakdown {
                    economic_justice: 80.0,
                    community_development: 75.0,
                    educational_impact: 70.0,
                    environmental: 82.0,
                    social_cohesion: 83.0,
                },
                long_term_projection: "Dampak sosial positif dan berkelanjutan".to_string(),
            }),
            bias_check_status: Some("passed".to_string()),
            bias_log: None,
            data_sanitization_version: Some("v2".to_string()),
        }
    }
}

#[async_trait]
impl AnalysisBackend for CannedBackend {
    async fn analyze(
        &self,
        records: &[TransactionRecord],
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        Ok(records.iter().map(Self::verdict).collect())
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("HalalGuard offline demo\n");

    let mut sheet = Worksheet::new();
    sheet.load(sample_records());
    validate_records(sheet.records())?;
    println!("Loaded {} sample transactions", sheet.len());

    let session = AnalysisSession::new(Arc::new(CannedBackend));
    let view = session.submit(sheet.records().to_vec()).await;
    render_view(&view);

    let stats = aggregate(&view.analyzed());
    render_statistics(&stats);
    render_report(&report(&view.results));

    let board = NoticeBoard::new();
    board.publish(Notification {
        kind: NotificationKind::Success,
        content: format!("Berhasil menganalisis {} transaksi", stats.total),
    });
    if let Some(notification) = board.current() {
        println!();
        render_notification(&notification);
    }

    if args.skip_monitor {
        return Ok(());
    }

    println!("\nSimulated monitoring (three refreshes)");
    let handle = MetricsPoller::spawn(
        SimulatedMetricsProvider::new(),
        Duration::from_millis(400),
        10,
    );
    tokio::time::sleep(Duration::from_millis(1_300)).await;
    render_monitor(&handle.view().await);
    handle.shutdown().await;

    Ok(())
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let raw = match (&args.file, &args.json) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(inline)) => inline.clone(),
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let records = parse_payload(&raw)?;
    println!("Submitting {} transactions for analysis", records.len());

    let config = AppConfig::load()?;
    let client = ApiClient::from_config(&config.api);
    let session = AnalysisSession::new(Arc::new(client));
    let view = session.submit(records).await;

    render_view(&view);
    if view.error.is_none() {
        render_statistics(&aggregate(&view.analyzed()));
        if args.report {
            render_report(&report(&view.results));
        }
    }

    Ok(())
}

pub(crate) async fn run_history() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = ApiClient::from_config(&config.api);

    let rows = client.transactions().await?;
    println!("Fetched {} stored transactions", rows.len());

    let view = history_view(rows);
    render_view(&view);
    render_statistics(&aggregate(&view.analyzed()));

    Ok(())
}

/// Stored history rendered through the same view path as a live session.
fn history_view(results: Vec<CombinedResult>) -> SessionView {
    SessionView {
        results,
        busy: false,
        error: None,
    }
}
