use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;

const REGISTRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A full company record as returned by `GET /company/{company_number}`.
///
/// Every field except the company number may be missing from the payload.
/// Missing fields fall back to "nothing to report".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_number: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub has_insolvency_history: bool,
    #[serde(default)]
    pub sic_codes: Option<Vec<String>>,
    #[serde(default)]
    pub accounts: Option<Accounts>,
    #[serde(default)]
    pub confirmation_statement: Option<ConfirmationStatement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Accounts {
    #[serde(default)]
    pub next_due: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfirmationStatement {
    #[serde(default)]
    pub overdue: Option<bool>,
}

impl CompanyProfile {
    pub fn sic_codes(&self) -> &[String] {
        self.sic_codes.as_deref().unwrap_or_default()
    }

    pub fn status_is(&self, status: &str) -> bool {
        self.company_status.as_deref() == Some(status)
    }

    /// Returns `None` when the date is absent or not in `YYYY-MM-DD` form.
    pub fn accounts_next_due(&self) -> Option<NaiveDate> {
        self.accounts
            .as_ref()
            .and_then(|a| a.next_due.as_deref())
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), REGISTRY_DATE_FORMAT).ok())
    }

    pub fn confirmation_statement_overdue(&self) -> bool {
        self.confirmation_statement
            .as_ref()
            .and_then(|c| c.overdue)
            .unwrap_or(false)
    }
}

/// One hit from the advanced company search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanySummary {
    pub company_number: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_status: Option<String>,
    #[serde(default)]
    pub sic_codes: Option<Vec<String>>,
}

impl CompanySummary {
    pub fn sic_codes(&self) -> &[String] {
        self.sic_codes.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanySearchPage {
    #[serde(
        default,
        alias = "hits",
        deserialize_with = "deserialize_default_from_null"
    )]
    pub total: u64,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub items: Vec<CompanySummary>,
}

impl CompanySearchPage {
    pub fn empty() -> Self {
        CompanySearchPage::default()
    }
}
