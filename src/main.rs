use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use melody_rs::audio::{AudioAdapter, RodioEngine};
use melody_rs::catalog;
use melody_rs::config::PlayerConfig;
use melody_rs::controller::{AppController, CoordinatorOptions, PlaybackCoordinator};
use melody_rs::logging;
use melody_rs::notification::{LogSurface, MediaControlsSurface, NotificationBridge, NotificationSurface};
use melody_rs::store::JsonFileStore;
use melody_rs::view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_error) = match PlayerConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (PlayerConfig::default(), Some(e)),
    };

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Melody-RS Starting ===");
    if let Some(e) = config_error {
        tracing::warn!(error = %format!("{:#}", e), "Falling back to default configuration");
    }

    let library_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(dirs::audio_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let library = catalog::load_catalog(&library_path)
        .with_context(|| format!("failed to load music from {}", library_path.display()))?;

    let engine = RodioEngine::spawn(config.tick_interval()).context("failed to start audio thread")?;
    let adapter = Arc::new(AudioAdapter::new(Arc::new(engine)));
    let store = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let options = CoordinatorOptions {
        auto_advance_delay: config.auto_advance_delay(),
    };
    let (coordinator, events) = PlaybackCoordinator::start(adapter, store, options).await;
    let runner = tokio::spawn(coordinator.clone().run(events));

    let bridge = Arc::new(NotificationBridge::new(notification_surface(&config)));
    bridge.initialize();
    bridge.set_controls(Arc::new(coordinator.clone()));
    let follower = tokio::spawn(bridge.clone().follow(coordinator.subscribe()));

    let mut controller = AppController::new(coordinator.clone(), library);
    controller.refresh_lists().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    coordinator.shutdown().await;
    if let Err(e) = runner.await {
        tracing::warn!(error = %e, "Coordinator task ended abnormally");
    }
    follower.abort();
    bridge.cleanup();

    tracing::info!("Melody-RS shutting down");
    Ok(())
}

fn notification_surface(config: &PlayerConfig) -> Arc<dyn NotificationSurface> {
    if config.enable_media_controls {
        match MediaControlsSurface::new(&config.notification_display_name, &config.notification_dbus_name) {
            Ok(surface) => return Arc::new(surface),
            Err(e) => tracing::warn!(error = %e, "Media controls unavailable, logging notifications instead"),
        }
    }
    Arc::new(LogSurface::new())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut AppController,
) -> io::Result<()> {
    // Lists change on their own when songs auto-advance
    let mut last_song = None;

    loop {
        let playback = controller.coordinator().state();
        let current = playback.current_song.as_ref().map(|song| song.id.clone());
        if current != last_song {
            controller.refresh_lists().await;
            last_song = current;
        }

        terminal.draw(|f| {
            AppView::render(f, &playback, &controller.ui);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                controller.handle_key_event(key).await;
            }
        }

        if controller.ui.should_quit {
            break;
        }
    }

    Ok(())
}
