use std::sync::Arc;

use anyhow::Result;
use forge_core::api::check_health;
use forge_core::{Config, ForgeApi, ForgeClient};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init()?;
    tracing::info!(path = %log_path.display(), "FORGE client starting");

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    tracing::info!(api = config.base_url(), "using FORGE backend");

    let api: Arc<dyn ForgeApi> = Arc::new(ForgeClient::from_config(&config)?);
    spawn_health_check(Arc::clone(&api));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(config, api, events.sender());
    app.init();

    let result = run(&mut terminal, &mut app, &mut events).await;

    // Tear down before leaving the alternate screen
    app.dispose();
    tui::restore()?;
    tracing::info!("FORGE client stopped");

    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

/// Readiness check; the result is only logged
fn spawn_health_check(api: Arc<dyn ForgeApi>) {
    tokio::spawn(async move {
        check_health(api.as_ref()).await;
    });
}
