use std::time::Duration;

use chrono::{NaiveDate, Utc};

use crate::{
    configuration::{RegistrySettings, ScanSettings},
    domain::{
        distress::{classify_on, is_relevant_code, is_relevant_summary},
        scan::{ScanResult, ScannedCompany},
        sic_code::ClassificationCodeSet,
    },
};

use super::{CompanyRegistry, ProfileLookup};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub page_size: u32,
    pub inter_call_delay: Duration,
    pub fetch_profiles: bool,
}

impl ScanOptions {
    pub fn from_settings(registry: &RegistrySettings, scan: &ScanSettings) -> Self {
        ScanOptions {
            page_size: registry.page_size,
            inter_call_delay: scan.inter_call_delay(),
            fetch_profiles: scan.fetch_profiles,
        }
    }
}

/// One sequential pass over `codes`. A failing code or company only shrinks
/// its own entry. Every code in the set gets a result, in configured order;
/// the set has already dropped repeated codes, so a caller that configured
/// duplicates gets one result per distinct code.
pub async fn run_scan<R: CompanyRegistry>(
    registry: &R,
    codes: &ClassificationCodeSet,
    options: &ScanOptions,
) -> Vec<ScanResult> {
    let today = Utc::now().date_naive();
    let mut results = Vec::with_capacity(codes.len());

    for (idx, code) in codes.codes().iter().enumerate() {
        if idx > 0 && !options.inter_call_delay.is_zero() {
            tokio::time::sleep(options.inter_call_delay).await;
        }

        let result = scan_code(registry, code, codes, options, today).await;
        log::info!(
            "Scanned SIC code {} | {} matches, {} distressed",
            code,
            result.total_matches,
            result.distressed().count()
        );
        results.push(result);
    }

    results
}

async fn scan_code<R: CompanyRegistry>(
    registry: &R,
    code: &str,
    targets: &ClassificationCodeSet,
    options: &ScanOptions,
    today: NaiveDate,
) -> ScanResult {
    let page = registry
        .search_by_classification_code(code, options.page_size)
        .await;

    let mut companies = Vec::with_capacity(page.items.len());
    for summary in page.items {
        let mut company = ScannedCompany::from_summary(summary);
        company.relevant = is_relevant_summary(&company.summary, targets);

        if options.fetch_profiles {
            match registry
                .fetch_company_profile(&company.summary.company_number)
                .await
            {
                ProfileLookup::Found(profile) => {
                    company.finding = classify_on(Some(&profile), today);
                    company.relevant = is_relevant_code(Some(&profile), targets);
                    company.profile = Some(profile);
                }
                ProfileLookup::NotFound | ProfileLookup::TransportError(_) => {
                    log::warn!(
                        "Skipping company {} under SIC code {}",
                        company.summary.company_number,
                        code
                    );
                }
            }
        }

        companies.push(company);
    }

    ScanResult {
        code: code.to_string(),
        total_matches: page.total,
        companies,
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex, time::Duration};

    use super::{run_scan, ScanOptions};
    use crate::{
        domain::{
            company::{CompanyProfile, CompanySearchPage, CompanySummary},
            distress::{DistressFinding, DistressSignal},
            scan::ScanResult,
            sic_code::ClassificationCodeSet,
        },
        services::{CompanyRegistry, ProfileLookup},
    };

    #[derive(Default)]
    struct FakeRegistry {
        pages: HashMap<String, CompanySearchPage>,
        profiles: HashMap<String, CompanyProfile>,
        broken_profiles: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn with_page(mut self, code: &str, numbers: &[&str]) -> Self {
            let items = numbers
                .iter()
                .map(|n| CompanySummary {
                    company_number: n.to_string(),
                    ..Default::default()
                })
                .collect::<Vec<_>>();
            self.pages.insert(
                code.to_string(),
                CompanySearchPage {
                    total: items.len() as u64,
                    items,
                },
            );
            self
        }

        fn with_profile(mut self, profile: CompanyProfile) -> Self {
            self.profiles
                .insert(profile.company_number.clone(), profile);
            self
        }
    }

    impl CompanyRegistry for FakeRegistry {
        async fn fetch_company_profile(&self, company_number: &str) -> ProfileLookup {
            self.calls
                .lock()
                .unwrap()
                .push(format!("profile:{}", company_number));

            if self.broken_profiles.iter().any(|n| n == company_number) {
                return ProfileLookup::TransportError("connection reset".to_string());
            }
            match self.profiles.get(company_number) {
                Some(profile) => ProfileLookup::Found(profile.clone()),
                None => ProfileLookup::NotFound,
            }
        }

        async fn search_by_classification_code(
            &self,
            code: &str,
            _page_size: u32,
        ) -> CompanySearchPage {
            self.calls.lock().unwrap().push(format!("search:{}", code));
            // Unknown codes behave like a failed call.
            self.pages.get(code).cloned().unwrap_or_default()
        }
    }

    fn options(fetch_profiles: bool) -> ScanOptions {
        ScanOptions {
            page_size: 10,
            inter_call_delay: Duration::ZERO,
            fetch_profiles,
        }
    }

    fn profile(number: &str, status: &str, insolvent: bool, sic: &str) -> CompanyProfile {
        CompanyProfile {
            company_number: number.to_string(),
            company_status: Some(status.to_string()),
            has_insolvency_history: insolvent,
            sic_codes: Some(vec![sic.to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failed_code_yields_empty_result() {
        let registry = FakeRegistry::default();
        let codes = ClassificationCodeSet::new(["00000"]);

        let results = run_scan(&registry, &codes, &options(true)).await;

        assert_eq!(results, vec![ScanResult::empty("00000")]);
    }

    #[tokio::test]
    async fn results_follow_input_order() {
        let registry = FakeRegistry::default()
            .with_page("56302", &["2"])
            .with_page("56101", &["1"]);
        let codes = ClassificationCodeSet::new(["56302", "00000", "56101"]);

        let results = run_scan(&registry, &codes, &options(false)).await;

        let order: Vec<&str> = results.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, vec!["56302", "00000", "56101"]);
        assert_eq!(results[1].total_matches, 0);
        assert_eq!(results[2].companies[0].summary.company_number, "1");
        assert_eq!(
            *registry.calls.lock().unwrap(),
            vec!["search:56302", "search:00000", "search:56101"]
        );
    }

    #[tokio::test]
    async fn profiles_are_classified_when_fetching() {
        let registry = FakeRegistry::default()
            .with_page("56101", &["1", "2", "3", "4"])
            .with_profile(profile("1", "liquidation", true, "56101"))
            .with_profile(profile("2", "active", false, "47110"));
        let registry = FakeRegistry {
            broken_profiles: vec!["4".to_string()],
            ..registry
        };
        let codes = ClassificationCodeSet::new(["56101", "56301"]);

        let results = run_scan(&registry, &codes, &options(true)).await;
        let companies = &results[0].companies;

        assert_eq!(companies.len(), 4);
        assert_eq!(
            companies[0].finding,
            DistressFinding::Signals(vec![
                DistressSignal::InsolvencyHistory,
                DistressSignal::InLiquidation,
            ])
        );
        assert!(companies[0].relevant);
        assert_eq!(companies[1].finding, DistressFinding::NoFindings);
        assert!(!companies[1].relevant);
        assert!(companies[2].profile.is_none());
        assert!(companies[3].profile.is_none());
        assert_eq!(companies[3].finding, DistressFinding::NoFindings);
        assert_eq!(results[0].distressed().count(), 1);
    }

    #[tokio::test]
    async fn summaries_only_without_profile_fetch() {
        let registry = FakeRegistry::default()
            .with_page("56101", &["1"])
            .with_profile(profile("1", "dissolved", false, "56101"));
        let codes = ClassificationCodeSet::new(["56101"]);

        let results = run_scan(&registry, &codes, &options(false)).await;

        assert_eq!(results[0].companies[0].profile, None);
        assert_eq!(*registry.calls.lock().unwrap(), vec!["search:56101"]);
    }

    #[tokio::test]
    async fn summary_codes_decide_relevance_without_profile_fetch() {
        let summary = |number: &str, sic: &str| CompanySummary {
            company_number: number.to_string(),
            sic_codes: Some(vec![sic.to_string()]),
            ..Default::default()
        };
        let mut registry = FakeRegistry::default();
        registry.pages.insert(
            "56101".to_string(),
            CompanySearchPage {
                total: 2,
                items: vec![summary("1", "56101"), summary("2", "47110")],
            },
        );
        let codes = ClassificationCodeSet::new(["56101"]);

        let results = run_scan(&registry, &codes, &options(false)).await;

        assert!(results[0].companies[0].relevant);
        assert!(!results[0].companies[1].relevant);
    }

    #[tokio::test]
    async fn duplicate_codes_are_scanned_once() {
        let registry = FakeRegistry::default().with_page("56101", &["1"]);
        let codes = ClassificationCodeSet::new(["56101", "56101"]);

        let results = run_scan(&registry, &codes, &options(false)).await;

        assert_eq!(results.len(), 1);
        assert_eq!(*registry.calls.lock().unwrap(), vec!["search:56101"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied_between_codes_only() {
        let registry = FakeRegistry::default();
        let codes = ClassificationCodeSet::new(["1", "2", "3"]);
        let opts = ScanOptions {
            inter_call_delay: Duration::from_secs(2),
            ..options(false)
        };

        let started = tokio::time::Instant::now();
        let results = run_scan(&registry, &codes, &opts).await;

        assert_eq!(results.len(), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(6));
    }
}
