//! View model for the dashboard and its text rendering.
//! Derived from controller state on every render; nothing here is cached.

use std::fmt::Write as _;

use serde::Serialize;

use crate::aligner::align;
use crate::chart::{self, ChartView, LegendEntry, Y_DOMAIN};
use crate::controller::{ControllerState, Phase};
use crate::error::{ErrorReport, ViewError};
use crate::summary::ConsensusSummary;
use crate::types::{Event, EventId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    pub id: EventId,
    pub title: String,
    /// `"<category> • Active|Resolved"`
    pub subtitle: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedEvent {
    pub id: EventId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRowView {
    pub tick: String,
    /// One cell per legend entry; `None` where that source did not report
    pub cells: Vec<Option<String>>,
}

/// Chart area state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChartPanel {
    /// Forecasts for the selection have not arrived yet
    Pending,
    NoData {
        reason: ErrorReport,
    },
    Chart {
        legend: Vec<LegendEntry>,
        rows: Vec<ChartRowView>,
        #[serde(rename = "droppedObservations")]
        dropped: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::large_enum_variant)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DashboardView {
    Loading,
    Ready {
        events: Vec<EventEntry>,
        #[serde(skip_serializing_if = "Option::is_none")]
        selected: Option<SelectedEvent>,
        #[serde(skip_serializing_if = "Option::is_none")]
        consensus: Option<ConsensusSummary>,
        #[serde(skip_serializing_if = "Option::is_none")]
        chart: Option<ChartPanel>,
        #[serde(rename = "lastError", skip_serializing_if = "Option::is_none")]
        last_error: Option<ErrorReport>,
    },
}

fn event_entry(event: &Event, selected: Option<EventId>) -> EventEntry {
    EventEntry {
        id: event.id,
        title: event.title.clone(),
        subtitle: format!("{} • {}", event.category, event.status_label()),
        selected: selected == Some(event.id),
    }
}

fn chart_panel(state: &ControllerState) -> ChartPanel {
    let Some(forecasts) = state.forecasts() else {
        return ChartPanel::Pending;
    };

    let series = align(forecasts, state.consensus());
    let dropped: Vec<String> = series
        .dropped
        .iter()
        .map(|d| format!("#{} from {}: {}", d.index, d.source_name, d.error))
        .collect();
    match ChartView::project(series) {
        ChartView::NoData => ChartPanel::NoData {
            reason: ErrorReport::from(&ViewError::NoData),
        },
        ChartView::Chart(projection) => {
            let columns = projection.columns();
            let rows = projection
                .rows()
                .iter()
                .map(|row| ChartRowView {
                    tick: chart::tick_label(row),
                    cells: columns
                        .iter()
                        .map(|c| row.value(c).map(chart::format_value))
                        .collect(),
                })
                .collect();
            ChartPanel::Chart {
                legend: projection.legend(),
                rows,
                dropped,
            }
        }
    }
}

pub fn build_view(state: &ControllerState) -> DashboardView {
    let selected = match state.phase() {
        Phase::Loading => return DashboardView::Loading,
        Phase::Ready(selected) => selected.as_ref(),
    };
    let selected_id = selected.map(|e| e.id);

    DashboardView::Ready {
        events: state
            .events()
            .iter()
            .map(|e| event_entry(e, selected_id))
            .collect(),
        selected: selected.map(|e| SelectedEvent {
            id: e.id,
            title: e.title.clone(),
            description: e.description.clone().filter(|d| !d.trim().is_empty()),
        }),
        consensus: selected
            .and(state.consensus())
            .map(ConsensusSummary::from_record),
        chart: selected.map(|_| chart_panel(state)),
        last_error: state.last_error().map(ErrorReport::from),
    }
}

/// Plain-text rendering for the terminal.
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = write_view(&mut out, view);
    out
}

fn write_view(out: &mut String, view: &DashboardView) -> std::fmt::Result {
    writeln!(out, "Consensus Forecast Aggregator")?;
    writeln!(out, "Aggregate probabilities from multiple prediction markets")?;
    writeln!(out)?;

    let DashboardView::Ready {
        events,
        selected,
        consensus,
        chart,
        last_error,
    } = view
    else {
        writeln!(out, "Loading...")?;
        return Ok(());
    };

    writeln!(out, "Events")?;
    if events.is_empty() {
        writeln!(out, "  No events available")?;
    }
    for (i, entry) in events.iter().enumerate() {
        let marker = if entry.selected { '>' } else { ' ' };
        writeln!(out, "{} {:>2}. {}", marker, i + 1, entry.title)?;
        writeln!(out, "      {}", entry.subtitle)?;
    }

    if let Some(selected) = selected {
        writeln!(out)?;
        writeln!(out, "== {} ==", selected.title)?;
        if let Some(description) = &selected.description {
            writeln!(out, "{}", description)?;
        }
    }

    if let Some(summary) = consensus {
        writeln!(out)?;
        writeln!(out, "Consensus Probability")?;
        writeln!(
            out,
            "  {}  ± {} (90% CI)",
            summary.probability, summary.margin
        )?;
        writeln!(
            out,
            "  Confidence Interval (90%): {} → {}",
            summary.interval_lower, summary.interval_upper
        )?;
        writeln!(
            out,
            "  Disagreement: {}  [{}: {}]",
            summary.disagreement,
            summary.disagreement_label,
            summary.disagreement_style.as_str()
        )?;
        writeln!(out, "  Aggregated from {}", summary.source_count)?;
        if let Some(violation) = &summary.invariant_violation {
            writeln!(out, "  ! {}", violation)?;
        }
    }

    if let Some(panel) = chart {
        writeln!(out)?;
        writeln!(out, "Forecast Curves")?;
        write_chart(out, panel)?;
    }

    if let Some(err) = last_error {
        writeln!(out)?;
        writeln!(out, "! {} ({})", err.message, err.recovery_suggestion)?;
    }

    Ok(())
}

fn write_chart(out: &mut String, panel: &ChartPanel) -> std::fmt::Result {
    let (legend, rows, dropped) = match panel {
        ChartPanel::Pending => return writeln!(out, "  Loading forecasts..."),
        ChartPanel::NoData { reason } => {
            writeln!(out, "  No forecast data available")?;
            return writeln!(out, "  {}", reason.recovery_suggestion);
        }
        ChartPanel::Chart {
            legend,
            rows,
            dropped,
        } => (legend, rows, dropped),
    };

    for entry in legend {
        let dash = entry.style.dash.map(|d| format!(", dash {}", d)).unwrap_or_default();
        writeln!(
            out,
            "  - {} ({}, width {}{})",
            entry.name, entry.style.color, entry.style.stroke_width, dash
        )?;
    }
    writeln!(out, "  y: {}% to {}%", Y_DOMAIN.0, Y_DOMAIN.1)?;

    let widths: Vec<usize> = legend.iter().map(|e| e.name.chars().count().max(6)).collect();
    write!(out, "  {:<16}", "time")?;
    for (entry, width) in legend.iter().zip(&widths) {
        write!(out, " {:>w$}", entry.name, w = *width)?;
    }
    writeln!(out)?;
    for row in rows {
        write!(out, "  {:<16}", row.tick)?;
        for (cell, width) in row.cells.iter().zip(&widths) {
            write!(out, " {:>w$}", cell.as_deref().unwrap_or("—"), w = *width)?;
        }
        writeln!(out)?;
    }

    for line in dropped {
        writeln!(out, "  omitted {}", line)?;
    }
    Ok(())
}
