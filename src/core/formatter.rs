//! Display values derived from raw posting data.
//!
//! Every function here is total and side-effect free.

use crate::models::{ContractType, LocationGroup};

pub const UNDETERMINED_LABEL: &str = "undetermined";
pub const FULL_TIME_LABEL: &str = "Full time";

const RANGE_SEPARATOR: char = '\u{2013}';

/// Group digits in threes with a comma
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Compensation range without currency
///
/// A stored zero counts as absent. An inverted range is shown ascending.
pub fn format_compensation(min: Option<i64>, max: Option<i64>) -> String {
    CompensationFormat::default().format(min, max)
}

/// Compensation formatting with an optional currency suffix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationFormat {
    currency: Option<String>,
}

impl CompensationFormat {
    pub fn with_currency(currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            currency: (!currency.trim().is_empty()).then_some(currency),
        }
    }

    pub fn format(&self, min: Option<i64>, max: Option<i64>) -> String {
        let min = min.filter(|v| *v != 0);
        let max = max.filter(|v| *v != 0);

        let amount = match (min, max) {
            (None, None) => return UNDETERMINED_LABEL.to_string(),
            (Some(min), Some(max)) => {
                let (low, high) = if min <= max { (min, max) } else { (max, min) };
                format!(
                    "{}{}{}",
                    format_thousands(low),
                    RANGE_SEPARATOR,
                    format_thousands(high)
                )
            }
            (Some(min), None) => format!("from {}", format_thousands(min)),
            (None, Some(max)) => format!("up to {}", format_thousands(max)),
        };

        match &self.currency {
            Some(currency) => format!("{} {}", amount, currency),
            None => amount,
        }
    }
}

/// Badge text for a marker; only shown for more than one posting
pub fn badge_label(count: usize) -> Option<String> {
    (count > 1).then(|| count.to_string())
}

pub fn group_badge(group: &LocationGroup) -> Option<String> {
    badge_label(group.len())
}

/// List panel header
pub fn active_offers_label(count: usize) -> String {
    match count {
        0 => "No active offers".to_string(),
        1 => "1 active offer".to_string(),
        n => format!("{} active offers", n),
    }
}

pub fn contract_label(contract: ContractType) -> &'static str {
    match contract {
        ContractType::Permanent => "Permanent",
        ContractType::FixedTerm => "Fixed-term",
        ContractType::Internship => "Internship",
        ContractType::TemporaryCover => "Temporary cover",
        ContractType::OneOffCover => "One-off cover",
        ContractType::IndependentPractice => "Independent practice",
    }
}

pub fn full_time_label(is_full_time: bool) -> Option<&'static str> {
    is_full_time.then_some(FULL_TIME_LABEL)
}
