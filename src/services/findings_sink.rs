use actix_web::web::Data;
use sqlx::PgPool;
use tokio::sync::{mpsc::UnboundedReceiver, RwLock};

use crate::{dal::finding_db, domain::scan::ScanReport};

/// The most recent completed scan, served read-only over HTTP.
#[derive(Default)]
pub struct LatestScan {
    report: RwLock<Option<ScanReport>>,
}

impl LatestScan {
    pub async fn snapshot(&self) -> Option<ScanReport> {
        self.report.read().await.clone()
    }

    pub async fn replace(&self, report: ScanReport) {
        *self.report.write().await = Some(report);
    }
}

pub async fn findings_persistance_handler(
    mut report_receiver: UnboundedReceiver<ScanReport>,
    latest: Data<LatestScan>,
    pool: PgPool,
) {
    log::info!("Started findings persistance handler");

    while let Some(report) = report_receiver.recv().await {
        let scan_id = report.scan_id;
        latest.replace(report.clone()).await;

        match finding_db::insert_scan_report(&pool, &report).await {
            Ok(rows) => log::info!("Persisted scan {} with {} findings", scan_id, rows),
            Err(e) => log::error!("Failed to persist scan {}: {:?}", scan_id, e),
        }
    }

    log::info!("Scan report channel closed, stopping findings persistance handler");
}
