mod audio;
mod config;
mod controller;
mod fetch;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use config::AppConfig;
use controller::AppController;
use fetch::{HttpFetch, ReqwestFetcher};
use model::{AppModel, ItunesClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(term = %config.term, volume = config.volume, "=== preview-rs Starting ===");

    let fetcher: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::new());
    let client = ItunesClient::new(fetcher.clone(), config.endpoint.clone());

    let mut app_model = AppModel::new(config.volume);

    // Playback is optional: search keeps working without an output device
    let audio_backend = match AudioBackend::new(fetcher, config.volume) {
        Ok(backend) => Some(backend),
        Err(e) => {
            tracing::error!(error = %e, "Audio init failed");
            app_model.set_error(AppController::format_error(&e));
            None
        }
    };

    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone(), client, audio_backend.clone());

    if let Some(event_channel) = audio_backend.as_ref().and_then(AudioBackend::take_event_channel) {
        controller.start_player_event_listener(event_channel);
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Bootstrap the results area instead of starting blank
    controller.perform_search(&config.term).await;

    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(backend) = &audio_backend {
        backend.shutdown();
    }

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("preview-rs shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Get current state
        let (transport, ui_state, results, should_quit) = {
            let mut model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors();

            (
                model_guard.transport().clone(),
                model_guard.ui_state().clone(),
                model_guard.search().view().clone(),
                model_guard.should_quit(),
            )
        };

        if should_quit {
            break;
        }

        terminal.draw(|f| {
            AppView::render(f, &transport, &ui_state, &results);
        })?;

        // Short poll keeps the progress bar within one tick of the backend
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
