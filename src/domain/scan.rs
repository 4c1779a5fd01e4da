use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    company::{CompanyProfile, CompanySummary},
    distress::DistressFinding,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedCompany {
    pub summary: CompanySummary,
    pub profile: Option<CompanyProfile>,
    pub finding: DistressFinding,
    pub relevant: bool,
}

impl ScannedCompany {
    pub fn from_summary(summary: CompanySummary) -> Self {
        ScannedCompany {
            summary,
            profile: None,
            finding: DistressFinding::NoFindings,
            relevant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub code: String,
    pub total_matches: u64,
    pub companies: Vec<ScannedCompany>,
}

impl ScanResult {
    pub fn empty(code: &str) -> Self {
        ScanResult {
            code: code.to_string(),
            total_matches: 0,
            companies: vec![],
        }
    }

    pub fn distressed(&self) -> impl Iterator<Item = &ScannedCompany> {
        self.companies.iter().filter(|c| c.finding.is_distressed())
    }
}

/// One completed pass of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<ScanResult>,
}

impl ScanReport {
    pub fn signal_count(&self) -> usize {
        self.results
            .iter()
            .flat_map(|r| r.companies.iter())
            .map(|c| c.finding.signals().len())
            .sum()
    }
}
