//! Interactive TUI for DashBorg.
//!
//! Four views: operation dispatch, live job monitoring, dashboard
//! statistics and config documents. The job poll loop only runs while the
//! jobs view is active.

mod app;
mod input;
mod ui;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::BackendApi;
use crate::config::AppConfig;

use app::TuiApp;
use input::InputMode;

/// Run the TUI against the configured backend.
pub async fn run(
    api: Arc<dyn BackendApi>,
    config: &AppConfig,
    preselect: Option<&str>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = TuiApp::new(api, config);
    let result = run_app(&mut terminal, &mut app, preselect).await;

    // Stop the poll loop before the terminal is restored.
    app.shutdown().await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    preselect: Option<&str>,
) -> Result<()> {
    // Initial data fetch
    app.init(preselect).await?;

    // Render cadence; job data itself is refreshed by the background poll
    // loop, this only controls how often the screen picks it up.
    let tick = Duration::from_millis(250);

    loop {
        if app.in_jobs_view() {
            app.refresh_jobs_from_board().await;
        }
        app.maybe_switch_to_jobs().await;

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(tick)? {
            let mode = InputMode {
                confirming: app.confirm.is_some(),
                searching: app.search_mode,
            };
            if let Some(action) = input::handle_event(event::read()?, mode) {
                app.handle_action(action).await;
            }
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
