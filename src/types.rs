//! Wire types for the forecast service.
//!
//! Field names match what the service's JSON responses produce (snake_case).

use std::fmt;

use serde::{Deserialize, Serialize};

pub type EventId = i64;

/// A tracked event as listed by `GET /api/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub resolution_date: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Event {
    pub fn status_label(&self) -> &'static str {
        if self.resolved {
            "Resolved"
        } else {
            "Active"
        }
    }
}

/// An instant as it arrives on the wire: ISO text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Text(String),
    EpochMillis(f64),
}

impl fmt::Display for WireTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireTimestamp::Text(s) => f.write_str(s),
            WireTimestamp::EpochMillis(ms) => write!(f, "{}", ms),
        }
    }
}

impl From<&str> for WireTimestamp {
    fn from(value: &str) -> Self {
        WireTimestamp::Text(value.to_string())
    }
}

/// One (source, timestamp, probability) sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: WireTimestamp,
    /// Probability in [0, 1]
    pub probability: f64,
    pub source_name: String,
}

impl Observation {
    pub fn new(timestamp: impl Into<WireTimestamp>, source_name: &str, probability: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            probability,
            source_name: source_name.to_string(),
        }
    }
}

/// Body of `GET /api/events/{id}/forecasts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventForecasts {
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(default)]
    pub event_title: Option<String>,
    pub forecasts: Vec<Observation>,
}

/// Qualitative spread bucket. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisagreementLabel {
    Low,
    Medium,
    High,
    Other(String),
}

impl From<String> for DisagreementLabel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Low" => DisagreementLabel::Low,
            "Medium" => DisagreementLabel::Medium,
            "High" => DisagreementLabel::High,
            _ => DisagreementLabel::Other(value),
        }
    }
}

impl From<DisagreementLabel> for String {
    fn from(label: DisagreementLabel) -> Self {
        label.as_str().to_string()
    }
}

impl DisagreementLabel {
    pub fn as_str(&self) -> &str {
        match self {
            DisagreementLabel::Low => "Low",
            DisagreementLabel::Medium => "Medium",
            DisagreementLabel::High => "High",
            DisagreementLabel::Other(s) => s,
        }
    }
}

/// Precomputed consensus for one event, from `GET /api/consensus/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRecord {
    pub probability: f64,
    pub disagreement: f64,
    pub disagreement_label: DisagreementLabel,
    pub confidence_interval_lower: f64,
    pub confidence_interval_upper: f64,
    #[serde(default)]
    pub source_count: u32,
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ConsensusRecord {
    /// Record with only the fields the view reads.
    pub fn new(
        probability: f64,
        disagreement: f64,
        disagreement_label: DisagreementLabel,
        confidence_interval_lower: f64,
        confidence_interval_upper: f64,
        source_count: u32,
    ) -> Self {
        Self {
            probability,
            disagreement,
            disagreement_label,
            confidence_interval_lower,
            confidence_interval_upper,
            source_count,
            event_id: None,
            event_title: None,
            timestamp: None,
        }
    }
}
