//! Terminal UI for ecoleta that lets users find waste collection points by state and city.

mod app;
mod config;
mod device;
mod input;
mod logging;
mod navigation;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ecoleta_core::location::GeolocationProvider;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::info;

use crate::app::{App, HomeForm, Services};
use crate::config::Config;
use crate::device::ConfiguredDevice;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let _log_guard = logging::init(&config)?;
    info!(api_url = %config.api_url, "starting ecoleta");

    // HTTP + service setup
    let client = Client::builder().user_agent("ecoleta/0.1").build()?;
    let api = ecoleta_provider_api::ports(client, &config.api_url);
    let device = Arc::new(ConfiguredDevice::new(config.position()));

    let services = Services {
        location: GeolocationProvider::new(device),
        catalog: api.catalog,
        points: api.points,
    };

    // App state
    let app = App::new(services, HomeForm::new(&config.uf, &config.city));

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("ecoleta stopped");
    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Pick up finished background requests before drawing
        app.tick();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
            && input::handle_key_event(key, &mut app) == Action::Quit
        {
            break;
        }

        // Let spawned requests make progress between polls
        tokio::task::yield_now().await;
    }

    Ok(())
}
