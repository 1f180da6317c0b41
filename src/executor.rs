//! Single-writer event loop for the dashboard.
//!
//! Fetches run as spawned tasks and report back over an mpsc channel. Only
//! the loop touches `ControllerState`, so completions are applied one at a
//! time in arrival order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval};

use crate::client::ForecastApi;
use crate::controller::{Command, ControllerState, Input};
use crate::view::{build_view, DashboardView};

/// Channel buffer size for loop messages
const MESSAGE_CHANNEL_SIZE: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Input(Input),
    /// 1-based position in the displayed event list
    SelectIndex(usize),
    Shutdown,
}

pub struct Executor<A: ForecastApi + 'static> {
    api: Arc<A>,
    forecast_window_hours: u32,
    refresh_interval: Option<Duration>,
    state: ControllerState,
    sender: mpsc::Sender<Message>,
    receiver: mpsc::Receiver<Message>,
}

impl<A: ForecastApi + 'static> Executor<A> {
    pub fn new(api: Arc<A>, forecast_window_hours: u32) -> Self {
        let (sender, receiver) = mpsc::channel(MESSAGE_CHANNEL_SIZE);
        Self {
            api,
            forecast_window_hours,
            refresh_interval: None,
            state: ControllerState::new(),
            sender,
            receiver,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Sender for user input and other external message sources.
    pub fn sender(&self) -> mpsc::Sender<Message> {
        self.sender.clone()
    }

    /// Issue the one-time event list fetch.
    pub fn start(&self) {
        let api = self.api.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = api.list_active_events().await;
            let _ = sender.send(Message::Input(Input::EventsLoaded(result))).await;
        });
    }

    /// Apply one message. Returns false once the loop should stop.
    pub fn handle(&mut self, message: Message) -> bool {
        let input = match message {
            Message::Shutdown => return false,
            Message::Input(input) => input,
            Message::SelectIndex(position) => {
                match position
                    .checked_sub(1)
                    .and_then(|i| self.state.events().get(i))
                {
                    Some(event) => Input::Select(event.id),
                    None => {
                        log::warn!("No event at position {}", position);
                        return true;
                    }
                }
            }
        };

        for command in self.state.apply(input) {
            self.execute(command);
        }
        true
    }

    fn execute(&self, command: Command) {
        let api = self.api.clone();
        let sender = self.sender.clone();
        let hours = self.forecast_window_hours;
        tokio::spawn(async move {
            let input = match command {
                Command::FetchForecasts(event_id) => Input::ForecastsLoaded {
                    event_id,
                    result: api.event_forecasts(event_id, hours).await,
                },
                Command::FetchConsensus(event_id) => Input::ConsensusLoaded {
                    event_id,
                    result: api.consensus(event_id).await,
                },
            };
            // Receiver gone means the loop has shut down
            let _ = sender.send(Message::Input(input)).await;
        });
    }

    pub async fn next_message(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Run until shutdown, calling `render` after every applied message.
    pub async fn run(mut self, mut render: impl FnMut(&DashboardView)) {
        self.start();
        render(&build_view(&self.state));

        let mut ticker = self
            .refresh_interval
            .map(|period| tokio::time::interval_at(Instant::now() + period, period));

        loop {
            let message = tokio::select! {
                message = self.receiver.recv() => message,
                _ = next_tick(&mut ticker) => Some(Message::Input(Input::Refresh)),
            };
            let Some(message) = message else {
                break;
            };
            if !self.handle(message) {
                log::info!("Shutting down");
                break;
            }
            render(&build_view(&self.state));
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
