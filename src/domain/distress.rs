use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Serialize, Serializer};

use super::{
    company::{CompanyProfile, CompanySummary},
    sic_code::ClassificationCodeSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistressSignal {
    LateAccounts,
    InsolvencyHistory,
    ConfirmationStatementOverdue,
    Dissolved,
    InLiquidation,
    ActiveButInsolvent,
}

impl DistressSignal {
    pub fn label(&self) -> &'static str {
        match self {
            DistressSignal::LateAccounts => "Late filing of accounts",
            DistressSignal::InsolvencyHistory => "Insolvency filings detected",
            DistressSignal::ConfirmationStatementOverdue => "Confirmation statement overdue",
            DistressSignal::Dissolved => "Company dissolved",
            DistressSignal::InLiquidation => "Company in liquidation",
            DistressSignal::ActiveButInsolvent => "Active but insolvent",
        }
    }
}

impl Serialize for DistressSignal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for DistressSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one profile. `Signals` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DistressFinding {
    #[default]
    NoFindings,
    Signals(Vec<DistressSignal>),
}

impl DistressFinding {
    pub fn signals(&self) -> &[DistressSignal] {
        match self {
            DistressFinding::NoFindings => &[],
            DistressFinding::Signals(signals) => signals,
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.signals().iter().map(DistressSignal::label).collect()
    }

    pub fn is_distressed(&self) -> bool {
        matches!(self, DistressFinding::Signals(_))
    }
}

// `null` for no findings, otherwise the array of labels.
impl Serialize for DistressFinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DistressFinding::NoFindings => serializer.serialize_none(),
            DistressFinding::Signals(signals) => signals.serialize(serializer),
        }
    }
}

struct DistressRule {
    signal: DistressSignal,
    applies: fn(&CompanyProfile, NaiveDate) -> bool,
}

// New rules go at the end so existing label order never moves.
const DISTRESS_RULES: [DistressRule; 6] = [
    DistressRule {
        signal: DistressSignal::LateAccounts,
        applies: accounts_overdue,
    },
    DistressRule {
        signal: DistressSignal::InsolvencyHistory,
        applies: has_insolvency_history,
    },
    DistressRule {
        signal: DistressSignal::ConfirmationStatementOverdue,
        applies: confirmation_statement_overdue,
    },
    DistressRule {
        signal: DistressSignal::Dissolved,
        applies: dissolved,
    },
    DistressRule {
        signal: DistressSignal::InLiquidation,
        applies: in_liquidation,
    },
    DistressRule {
        signal: DistressSignal::ActiveButInsolvent,
        applies: active_but_insolvent,
    },
];

fn accounts_overdue(profile: &CompanyProfile, today: NaiveDate) -> bool {
    profile
        .accounts_next_due()
        .is_some_and(|next_due| next_due < today)
}

fn has_insolvency_history(profile: &CompanyProfile, _: NaiveDate) -> bool {
    profile.has_insolvency_history
}

fn confirmation_statement_overdue(profile: &CompanyProfile, _: NaiveDate) -> bool {
    profile.confirmation_statement_overdue()
}

fn dissolved(profile: &CompanyProfile, _: NaiveDate) -> bool {
    profile.status_is("dissolved")
}

fn in_liquidation(profile: &CompanyProfile, _: NaiveDate) -> bool {
    profile.status_is("liquidation")
}

fn active_but_insolvent(profile: &CompanyProfile, _: NaiveDate) -> bool {
    profile.status_is("active") && profile.has_insolvency_history
}

/// Classifies a profile against today's date (UTC).
pub fn classify(profile: Option<&CompanyProfile>) -> DistressFinding {
    classify_on(profile, Utc::now().date_naive())
}

/// Runs every rule against the same profile and collects the ones that fire,
/// in rule order.
pub fn classify_on(profile: Option<&CompanyProfile>, today: NaiveDate) -> DistressFinding {
    let Some(profile) = profile else {
        return DistressFinding::NoFindings;
    };

    let signals: Vec<DistressSignal> = DISTRESS_RULES
        .iter()
        .filter(|rule| (rule.applies)(profile, today))
        .map(|rule| rule.signal)
        .collect();

    match signals.is_empty() {
        true => DistressFinding::NoFindings,
        false => DistressFinding::Signals(signals),
    }
}

pub fn is_relevant_code(profile: Option<&CompanyProfile>, targets: &ClassificationCodeSet) -> bool {
    profile.is_some_and(|p| overlaps(p.sic_codes(), targets))
}

/// Same test as [`is_relevant_code`] for a search hit's own codes.
pub fn is_relevant_summary(summary: &CompanySummary, targets: &ClassificationCodeSet) -> bool {
    overlaps(summary.sic_codes(), targets)
}

fn overlaps(codes: &[String], targets: &ClassificationCodeSet) -> bool {
    codes.iter().any(|code| targets.contains(code))
}
