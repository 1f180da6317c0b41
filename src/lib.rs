pub mod aligner;
pub mod chart;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod summary;
pub mod timekey;
pub mod types;
pub mod view;

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use client::HttpForecastClient;
use controller::Input;
use error::ViewError;
use executor::{Executor, Message};

/// Clears the terminal before each render.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Run the dashboard against the configured forecast service until the user quits.
pub async fn run() -> Result<(), ViewError> {
    let config = config::load_config()?;
    log::info!(
        "Forecast service: {} (window {}h)",
        config.api_base_url,
        config.forecast_window_hours
    );

    let client = HttpForecastClient::new(config.base_url()?, config.request_timeout())?;
    let executor = Executor::new(Arc::new(client), config.forecast_window_hours)
        .with_refresh_interval(config.refresh_interval());

    spawn_stdin_reader(executor.sender());

    executor
        .run(|dashboard| {
            let mut stdout = std::io::stdout().lock();
            let _ = write!(stdout, "{}{}", CLEAR_SCREEN, view::render_text(dashboard));
            let _ = writeln!(stdout, "\n[number] select event   r refresh   q quit");
            let _ = stdout.flush();
        })
        .await;

    Ok(())
}

/// Parse one line of user input.
pub fn parse_command(line: &str) -> Option<Message> {
    let line = line.trim();
    match line {
        "q" | "quit" => Some(Message::Shutdown),
        "r" | "refresh" => Some(Message::Input(Input::Refresh)),
        _ => line.parse::<usize>().ok().map(Message::SelectIndex),
    }
}

fn spawn_stdin_reader(sender: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let message = match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(message) => message,
                    None => {
                        log::debug!("Ignoring input {:?}", line);
                        continue;
                    }
                },
                Ok(None) => Message::Shutdown,
                Err(e) => {
                    log::warn!("stdin read failed: {}", e);
                    Message::Shutdown
                }
            };
            let stop = message == Message::Shutdown;
            if sender.send(message).await.is_err() || stop {
                break;
            }
        }
    });
}
