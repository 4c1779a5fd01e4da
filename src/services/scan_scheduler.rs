use std::time::Duration;

use chrono::Utc;
use tokio::{sync::mpsc::UnboundedSender, time};
use uuid::Uuid;

use crate::domain::{scan::ScanReport, sic_code::ClassificationCodeSet};

use super::{run_scan, CompanyRegistry, ScanOptions};

pub struct ScanSchedule {
    pub codes: ClassificationCodeSet,
    pub options: ScanOptions,
    pub interval: Duration,
}

pub async fn scan_scheduler_handler<R: CompanyRegistry>(
    registry: R,
    schedule: ScanSchedule,
    report_sender: UnboundedSender<ScanReport>,
) {
    log::info!(
        "Started scan scheduler | {} SIC codes every {:?}",
        schedule.codes.len(),
        schedule.interval
    );

    // First tick completes immediately
    let mut interval = time::interval(schedule.interval);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let report = run_scheduled_scan(&registry, &schedule.codes, &schedule.options).await;

        if let Err(e) = report_sender.send(report) {
            log::error!(
                "Scan report channel got an Error: {:?} | Stopping scan scheduler",
                e
            );
            break;
        }
    }
}

pub async fn run_scheduled_scan<R: CompanyRegistry>(
    registry: &R,
    codes: &ClassificationCodeSet,
    options: &ScanOptions,
) -> ScanReport {
    let scan_id = Uuid::new_v4();
    let started_at = Utc::now();
    log::info!("Scan {} started over {} SIC codes", scan_id, codes.len());

    let results = run_scan(registry, codes, options).await;

    let report = ScanReport {
        scan_id,
        started_at,
        finished_at: Utc::now(),
        results,
    };
    log::info!(
        "Scan {} finished | {} codes, {} distress signals",
        scan_id,
        report.results.len(),
        report.signal_count()
    );

    report
}
