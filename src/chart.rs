//! Chart projection: row order, column order and per-column styling.

use serde::Serialize;

use crate::aligner::{AlignedRow, AlignedSeries, CONSENSUS_COLUMN};

/// Source line colors, assigned by column position.
pub const COLOR_PALETTE: &[&str] = &[
    "#3b82f6", // blue
    "#10b981", // green
    "#f59e0b", // amber
    "#ef4444", // red
    "#8b5cf6", // purple
    "#ec4899", // pink
];

/// Reserved color of the consensus overlay.
pub const CONSENSUS_COLOR: &str = "#8b5cf6";

/// Fixed y-axis domain, in percent.
pub const Y_DOMAIN: (f64, f64) = (0.0, 100.0);

/// Visual style of one chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStyle {
    pub color: &'static str,
    pub stroke_width: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

impl SeriesStyle {
    pub const CONSENSUS: SeriesStyle = SeriesStyle {
        color: CONSENSUS_COLOR,
        stroke_width: 3,
        dash: Some("5 5"),
    };

    fn source(index: usize) -> Self {
        SeriesStyle {
            color: COLOR_PALETTE[index % COLOR_PALETTE.len()],
            stroke_width: 2,
            dash: None,
        }
    }
}

/// What the chart area shows for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    /// No observation survived alignment; render the "no data" state.
    NoData,
    Chart(ChartProjection),
}

impl ChartView {
    pub fn project(series: AlignedSeries) -> Self {
        if series.is_empty() {
            ChartView::NoData
        } else {
            ChartView::Chart(ChartProjection::new(series))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartProjection {
    rows: Vec<AlignedRow>,
    sources: Vec<String>,
    has_consensus: bool,
}

impl ChartProjection {
    fn new(series: AlignedSeries) -> Self {
        Self {
            rows: order(series.rows),
            sources: series.sources,
            has_consensus: series.has_consensus,
        }
    }

    /// Rows ascending by instant.
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Source names in first-seen order, then `Consensus` if present.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.sources.iter().map(String::as_str).collect();
        if self.has_consensus {
            columns.push(CONSENSUS_COLUMN);
        }
        columns
    }

    /// Style for a column. Unknown names get the style of the next free slot
    /// so the mapping stays total.
    pub fn style_for(&self, column: &str) -> SeriesStyle {
        if column == CONSENSUS_COLUMN {
            return SeriesStyle::CONSENSUS;
        }
        let index = self
            .sources
            .iter()
            .position(|s| s == column)
            .unwrap_or(self.sources.len());
        SeriesStyle::source(index)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.columns()
            .into_iter()
            .map(|name| LegendEntry {
                name: name.to_string(),
                style: self.style_for(name),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub style: SeriesStyle,
}

/// Stable ascending sort by instant; equal instants keep input order.
pub fn order(mut rows: Vec<AlignedRow>) -> Vec<AlignedRow> {
    rows.sort_by_key(|row| row.key.instant());
    rows
}

/// X-axis tick label, UTC.
pub fn tick_label(row: &AlignedRow) -> String {
    row.key.instant().format("%Y-%m-%d %H:%M").to_string()
}

/// Tooltip value format.
pub fn format_value(value: f64) -> String {
    format!("{:.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::align;
    use crate::timekey::normalize;
    use crate::types::{ConsensusRecord, DisagreementLabel, Observation, WireTimestamp};
    use std::collections::BTreeMap;

    fn row(ts: &str, marker: f64) -> AlignedRow {
        let mut columns = BTreeMap::new();
        columns.insert("marker".to_string(), marker);
        AlignedRow {
            key: normalize(&WireTimestamp::from(ts)).unwrap(),
            columns,
        }
    }

    fn markers(rows: &[AlignedRow]) -> Vec<f64> {
        rows.iter().map(|r| r.columns["marker"]).collect()
    }

    #[test]
    fn test_order_ascending() {
        let rows = vec![
            row("2024-05-03T00:00:00Z", 3.0),
            row("2024-05-01T00:00:00Z", 1.0),
            row("2024-05-02T00:00:00Z", 2.0),
        ];
        assert_eq!(markers(&order(rows)), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_order_stable_for_equal_instants() {
        let rows = vec![
            row("2024-05-02T00:00:00Z", 10.0),
            row("2024-05-01T00:00:00Z", 20.0),
            row("2024-05-02T00:00:00Z", 30.0),
            row("2024-05-02T00:00:00Z", 40.0),
        ];
        assert_eq!(markers(&order(rows)), vec![20.0, 10.0, 30.0, 40.0]);
    }

    #[test]
    fn test_order_idempotent() {
        let rows = vec![
            row("2024-05-02T00:00:00Z", 1.0),
            row("2024-05-01T00:00:00Z", 2.0),
            row("2024-05-02T00:00:00Z", 3.0),
        ];
        let once = order(rows);
        let twice = order(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_series_is_no_data() {
        assert_eq!(ChartView::project(align(&[], None)), ChartView::NoData);

        let consensus = ConsensusRecord::new(0.5, 0.1, DisagreementLabel::Low, 0.4, 0.6, 2);
        assert_eq!(
            ChartView::project(align(&[], Some(&consensus))),
            ChartView::NoData
        );
    }

    fn projection(obs: &[Observation], with_consensus: bool) -> ChartProjection {
        let consensus = ConsensusRecord::new(0.45, 0.1, DisagreementLabel::Low, 0.4, 0.5, 2);
        let series = align(obs, with_consensus.then_some(&consensus));
        match ChartView::project(series) {
            ChartView::Chart(p) => p,
            ChartView::NoData => panic!("expected chart"),
        }
    }

    #[test]
    fn test_columns_first_seen_then_consensus() {
        let obs = vec![
            Observation::new("2024-05-02T00:00:00Z", "Kalshi", 0.3),
            Observation::new("2024-05-01T00:00:00Z", "Polymarket", 0.5),
            Observation::new("2024-05-01T00:00:00Z", "Kalshi", 0.4),
        ];
        assert_eq!(projection(&obs, true).columns(), vec!["Kalshi", "Polymarket", "Consensus"]);
        assert_eq!(projection(&obs, false).columns(), vec!["Kalshi", "Polymarket"]);
    }

    #[test]
    fn test_scenario_rows_ordered() {
        let obs = vec![
            Observation::new("2024-05-01T11:00:00Z", "A", 0.4),
            Observation::new("2024-05-01T10:00:00Z", "A", 0.3),
            Observation::new("2024-05-01T10:00:00Z", "B", 0.5),
        ];
        let p = projection(&obs, true);
        let keys: Vec<&str> = p.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-05-01T10:00:00.000Z", "2024-05-01T11:00:00.000Z"]);
        assert_eq!(tick_label(&p.rows()[0]), "2024-05-01 10:00");
    }

    #[test]
    fn test_style_mapping() {
        let names = ["s0", "s1", "s2", "s3", "s4", "s5", "s6"];
        let obs: Vec<Observation> = names
            .iter()
            .map(|n| Observation::new("2024-05-01T00:00:00Z", n, 0.5))
            .collect();
        let p = projection(&obs, true);

        assert_eq!(p.style_for("Consensus"), SeriesStyle::CONSENSUS);
        assert_eq!(p.style_for("s0").color, COLOR_PALETTE[0]);
        assert_eq!(p.style_for("s5").color, COLOR_PALETTE[5]);
        // Palette wraps
        assert_eq!(p.style_for("s6").color, COLOR_PALETTE[0]);
        assert_eq!(p.style_for("s1").stroke_width, 2);
        assert!(p.style_for("s1").dash.is_none());

        // Same input, same mapping
        let again = projection(&obs, true);
        assert_eq!(p.legend(), again.legend());
        assert_eq!(p.legend().len(), 8);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(45.0), "45.0%");
        assert_eq!(format_value(33.333), "33.3%");
    }
}
