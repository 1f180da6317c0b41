//! Display strings for the consensus panel.

use serde::Serialize;

use crate::error::ViewError;
use crate::types::{ConsensusRecord, DisagreementLabel};

/// Badge style of a disagreement label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisagreementStyle {
    Favorable,
    Caution,
    Alert,
    Neutral,
}

impl DisagreementStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            DisagreementStyle::Favorable => "favorable",
            DisagreementStyle::Caution => "caution",
            DisagreementStyle::Alert => "alert",
            DisagreementStyle::Neutral => "neutral",
        }
    }
}

/// `0.5` -> `"50.0%"`
pub fn percent(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

/// Half-width of the confidence interval, as a fraction.
pub fn margin(record: &ConsensusRecord) -> f64 {
    (record.confidence_interval_upper - record.confidence_interval_lower) / 2.0
}

pub fn disagreement_style(label: &DisagreementLabel) -> DisagreementStyle {
    match label {
        DisagreementLabel::Low => DisagreementStyle::Favorable,
        DisagreementLabel::Medium => DisagreementStyle::Caution,
        DisagreementLabel::High => DisagreementStyle::Alert,
        DisagreementLabel::Other(_) => DisagreementStyle::Neutral,
    }
}

pub fn source_count_phrase(n: u32) -> String {
    if n == 1 {
        "1 source".to_string()
    } else {
        format!("{} sources", n)
    }
}

/// Checks `lower <= probability <= upper`.
pub fn check_interval(record: &ConsensusRecord) -> Result<(), ViewError> {
    let ConsensusRecord {
        probability,
        confidence_interval_lower: lower,
        confidence_interval_upper: upper,
        ..
    } = *record;
    if lower <= probability && probability <= upper {
        Ok(())
    } else {
        Err(ViewError::InvariantViolation {
            lower,
            probability,
            upper,
        })
    }
}

/// Everything the consensus panel renders, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusSummary {
    pub probability: String,
    pub margin: String,
    pub interval_lower: String,
    pub interval_upper: String,
    pub disagreement: String,
    pub disagreement_label: String,
    pub disagreement_style: DisagreementStyle,
    pub source_count: String,
    /// Set when the record's interval does not contain its probability.
    /// The other fields still show the raw values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invariant_violation: Option<String>,
}

impl ConsensusSummary {
    pub fn from_record(record: &ConsensusRecord) -> Self {
        let invariant_violation = match check_interval(record) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("Consensus record rendered despite violation: {}", e);
                Some(e.to_string())
            }
        };

        Self {
            probability: percent(record.probability),
            margin: percent(margin(record)),
            interval_lower: percent(record.confidence_interval_lower),
            interval_upper: percent(record.confidence_interval_upper),
            disagreement: percent(record.disagreement),
            disagreement_label: record.disagreement_label.as_str().to_string(),
            disagreement_style: disagreement_style(&record.disagreement_label),
            source_count: source_count_phrase(record.source_count),
            invariant_violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(probability: f64, lower: f64, upper: f64) -> ConsensusRecord {
        ConsensusRecord::new(probability, 0.12, DisagreementLabel::Medium, lower, upper, 4)
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.5), "50.0%");
        assert_eq!(percent(0.0), "0.0%");
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(percent(0.1234), "12.3%");
    }

    #[test]
    fn test_margin() {
        let r = record(0.5, 0.40, 0.60);
        assert_eq!(percent(margin(&r)), "10.0%");
    }

    #[test]
    fn test_disagreement_style() {
        let low = disagreement_style(&DisagreementLabel::Low);
        let medium = disagreement_style(&DisagreementLabel::Medium);
        let high = disagreement_style(&DisagreementLabel::High);
        assert_eq!(low.as_str(), "favorable");
        assert_eq!(medium.as_str(), "caution");
        assert_eq!(high.as_str(), "alert");
        assert!(low != medium && medium != high && low != high);
        for style in [low, medium, high] {
            assert_ne!(style, DisagreementStyle::Neutral);
        }

        for other in ["", "low", "Very High", "Unknown"] {
            let label = DisagreementLabel::from(other.to_string());
            assert_eq!(disagreement_style(&label), DisagreementStyle::Neutral);
        }
    }

    #[test]
    fn test_source_count_phrase() {
        assert_eq!(source_count_phrase(0), "0 sources");
        assert_eq!(source_count_phrase(1), "1 source");
        assert_eq!(source_count_phrase(2), "2 sources");
    }

    #[test]
    fn test_summary_fields() {
        let summary = ConsensusSummary::from_record(&record(0.45, 0.40, 0.50));
        assert_eq!(summary.probability, "45.0%");
        assert_eq!(summary.margin, "5.0%");
        assert_eq!(summary.interval_lower, "40.0%");
        assert_eq!(summary.interval_upper, "50.0%");
        assert_eq!(summary.disagreement, "12.0%");
        assert_eq!(summary.disagreement_label, "Medium");
        assert_eq!(summary.disagreement_style, DisagreementStyle::Caution);
        assert_eq!(summary.source_count, "4 sources");
        assert!(summary.invariant_violation.is_none());
    }

    #[test]
    fn test_interval_violation_flagged_but_rendered() {
        let r = record(0.7, 0.40, 0.60);
        assert!(matches!(
            check_interval(&r),
            Err(ViewError::InvariantViolation { .. })
        ));

        let summary = ConsensusSummary::from_record(&r);
        assert!(summary.invariant_violation.is_some());
        assert_eq!(summary.probability, "70.0%");
        assert_eq!(summary.margin, "10.0%");
    }

    #[test]
    fn test_interval_bounds_inclusive() {
        assert!(check_interval(&record(0.4, 0.4, 0.6)).is_ok());
        assert!(check_interval(&record(0.6, 0.4, 0.6)).is_ok());
    }
}
