//! Reshape a flat observation list into one row per timestamp.
//!
//! Rows are sparse: a row only carries the sources that reported at its
//! instant. When a consensus record is present its probability is written
//! into every row as the `Consensus` column, constant across the window.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::error::ViewError;
use crate::timekey::{self, TimeKey};
use crate::types::{ConsensusRecord, Observation};

/// Column name of the synthetic consensus series.
pub const CONSENSUS_COLUMN: &str = "Consensus";

/// One timestamp's values across every reporting source, as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow {
    #[serde(rename = "timestamp", serialize_with = "serialize_key")]
    pub key: TimeKey,
    pub columns: BTreeMap<String, f64>,
}

fn serialize_key<S: serde::Serializer>(key: &TimeKey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(key.as_str())
}

impl AlignedRow {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.columns.get(column).copied()
    }
}

/// An observation left out of the table and why.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedObservation {
    /// Position in the forecast response
    pub index: usize,
    pub source_name: String,
    pub error: ViewError,
}

/// Output of [`align`]: rows in first-seen order plus what the chart needs
/// to know about the columns.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    pub rows: Vec<AlignedRow>,
    /// Distinct source names in first-seen order
    pub sources: Vec<String>,
    pub has_consensus: bool,
    pub dropped: Vec<DroppedObservation>,
}

impl AlignedSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group observations by normalized timestamp, then by source.
///
/// A repeated (timestamp, source) pair keeps the value that comes last in
/// input order. Observations whose timestamp cannot be normalized are
/// dropped and reported; they never create or touch a row.
pub fn align(observations: &[Observation], consensus: Option<&ConsensusRecord>) -> AlignedSeries {
    let mut series = AlignedSeries::default();
    let mut row_index: HashMap<TimeKey, usize> = HashMap::new();
    let mut seen_sources: HashSet<&str> = HashSet::new();

    for (index, obs) in observations.iter().enumerate() {
        let key = match timekey::normalize(&obs.timestamp) {
            Ok(key) => key,
            Err(error) => {
                log::warn!(
                    "Dropping observation {} from {}: {}",
                    index,
                    obs.source_name,
                    error
                );
                series.dropped.push(DroppedObservation {
                    index,
                    source_name: obs.source_name.clone(),
                    error,
                });
                continue;
            }
        };

        let slot = *row_index.entry(key.clone()).or_insert_with(|| {
            series.rows.push(AlignedRow {
                key,
                columns: BTreeMap::new(),
            });
            series.rows.len() - 1
        });
        series.rows[slot]
            .columns
            .insert(obs.source_name.clone(), obs.probability * 100.0);

        if seen_sources.insert(obs.source_name.as_str()) {
            series.sources.push(obs.source_name.clone());
        }
    }

    if let Some(consensus) = consensus {
        let value = consensus.probability * 100.0;
        for row in &mut series.rows {
            row.columns.insert(CONSENSUS_COLUMN.to_string(), value);
        }
        series.has_consensus = true;
    }

    series
}
