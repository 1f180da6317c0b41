//! Event selection state machine.
//!
//! `apply` is a pure transition: it updates the state for one input and
//! returns the fetches the caller must issue. Fetch results come back as
//! inputs tagged with the event id they were requested for, and are only
//! applied while that event is still selected.

use crate::error::ViewError;
use crate::types::{ConsensusRecord, Event, EventId, Observation};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Ready(Option<Event>),
}

/// Inputs that drive the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    EventsLoaded(Result<Vec<Event>, ViewError>),
    Select(EventId),
    Refresh,
    ForecastsLoaded {
        event_id: EventId,
        result: Result<Vec<Observation>, ViewError>,
    },
    ConsensusLoaded {
        event_id: EventId,
        result: Result<ConsensusRecord, ViewError>,
    },
}

/// Fetches requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FetchForecasts(EventId),
    FetchConsensus(EventId),
}

impl Command {
    fn both(event_id: EventId) -> Vec<Command> {
        vec![
            Command::FetchForecasts(event_id),
            Command::FetchConsensus(event_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    phase: Phase,
    events: Vec<Event>,
    /// `None` until the first forecast response for the current selection
    forecasts: Option<Vec<Observation>>,
    consensus: Option<ConsensusRecord>,
    /// Failures are kept per fetch so one fetch's success never hides the other's failure
    events_error: Option<ViewError>,
    forecasts_error: Option<ViewError>,
    consensus_error: Option<ViewError>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            events: Vec::new(),
            forecasts: None,
            consensus: None,
            events_error: None,
            forecasts_error: None,
            consensus_error: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn selected(&self) -> Option<&Event> {
        match &self.phase {
            Phase::Ready(selected) => selected.as_ref(),
            Phase::Loading => None,
        }
    }

    pub fn selected_id(&self) -> Option<EventId> {
        self.selected().map(|e| e.id)
    }

    pub fn forecasts(&self) -> Option<&[Observation]> {
        self.forecasts.as_deref()
    }

    pub fn consensus(&self) -> Option<&ConsensusRecord> {
        self.consensus.as_ref()
    }

    /// The outstanding fetch failure, if any: forecasts, then consensus, then the event list.
    pub fn last_error(&self) -> Option<&ViewError> {
        self.forecasts_error
            .as_ref()
            .or(self.consensus_error.as_ref())
            .or(self.events_error.as_ref())
    }

    pub fn apply(&mut self, input: Input) -> Vec<Command> {
        match input {
            Input::EventsLoaded(result) => self.on_events_loaded(result),
            Input::Select(event_id) => self.on_select(event_id),
            Input::Refresh => match self.selected_id() {
                Some(id) => {
                    log::info!("Refreshing event {}", id);
                    Command::both(id)
                }
                None => Vec::new(),
            },
            Input::ForecastsLoaded { event_id, result } => {
                if self.accepts(event_id, "forecasts") {
                    match result {
                        Ok(forecasts) => {
                            self.forecasts = Some(forecasts);
                            self.forecasts_error = None;
                        }
                        Err(e) => {
                            log::warn!("Failed to fetch forecasts for event {}: {}", event_id, e);
                            self.forecasts_error = Some(e);
                        }
                    }
                }
                Vec::new()
            }
            Input::ConsensusLoaded { event_id, result } => {
                if self.accepts(event_id, "consensus") {
                    match result {
                        Ok(consensus) => {
                            self.consensus = Some(consensus);
                            self.consensus_error = None;
                        }
                        Err(e) => {
                            log::warn!("Failed to fetch consensus for event {}: {}", event_id, e);
                            self.consensus_error = Some(e);
                        }
                    }
                }
                Vec::new()
            }
        }
    }

    fn on_events_loaded(&mut self, result: Result<Vec<Event>, ViewError>) -> Vec<Command> {
        match result {
            Ok(events) => {
                log::info!("Loaded {} active events", events.len());
                self.events = events;
                self.events_error = None;
                if self.selected().is_some() {
                    return Vec::new();
                }
                let first = self.events.first().cloned();
                let commands = first
                    .as_ref()
                    .map(|e| Command::both(e.id))
                    .unwrap_or_default();
                self.phase = Phase::Ready(first);
                commands
            }
            Err(e) => {
                log::warn!("Failed to load events: {}", e);
                self.events_error = Some(e);
                if self.phase == Phase::Loading {
                    self.phase = Phase::Ready(None);
                }
                Vec::new()
            }
        }
    }

    fn on_select(&mut self, event_id: EventId) -> Vec<Command> {
        if self.phase == Phase::Loading {
            return Vec::new();
        }
        let Some(event) = self.events.iter().find(|e| e.id == event_id).cloned() else {
            log::warn!("Ignoring selection of unknown event {}", event_id);
            return Vec::new();
        };

        if self.selected_id() == Some(event_id) {
            log::info!("Re-selected event {}, refreshing", event_id);
        } else {
            log::info!("Selected event {} ({})", event_id, event.title);
            // Datasets belong to the previous selection's fetch cycle
            self.forecasts = None;
            self.consensus = None;
            self.forecasts_error = None;
            self.consensus_error = None;
            self.phase = Phase::Ready(Some(event));
        }
        Command::both(event_id)
    }

    fn accepts(&self, event_id: EventId, what: &str) -> bool {
        let current = self.selected_id();
        if current == Some(event_id) {
            true
        } else {
            log::debug!(
                "Discarding stale {} for event {} (selected: {:?})",
                what,
                event_id,
                current
            );
            false
        }
    }
}
