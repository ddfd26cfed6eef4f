// localchat — A terminal chat interface for local and remote language models
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

mod actions;
mod events;
mod input;
mod keys;
mod state;

pub use actions::{
    HeaderAction, HeaderActions, cycle_conversation, new_conversation, regenerate_last_response,
    reload_model, run_header_action, stop_generation, submit_input,
};
pub use events::{handle_engine_event, handle_terminal_event};
pub use input::InputState;
pub use state::{ActiveGeneration, App, AppConfig, Notice, NoticeKind, Overlay};

use crate::Cli;
use crate::engine::{EngineConfig, spawn_engine};
use crate::error::AppError;
use anyhow::Context as _;
use crossterm::event::EventStream;
use futures::{FutureExt as _, StreamExt as _};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Build the app and start the engine task. Must run inside a Tokio runtime.
pub fn create_app(cli: &Cli) -> anyhow::Result<App> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = spawn_engine(
        EngineConfig {
            load_delay: Duration::from_millis(cli.load_delay_ms),
            token_delay: Duration::from_millis(cli.token_delay_ms),
        },
        event_tx.clone(),
    );
    let config = AppConfig {
        model: cli.model.clone(),
        scroll_threshold: cli.scroll_threshold,
        show_shortcuts: !cli.no_shortcuts,
        export_dir: None,
    };
    let mut app = App::new(config, engine, event_tx, event_rx);

    if let Some(path) = cli.import.as_deref() {
        app.store.import_from(path).map_err(|err| {
            anyhow::Error::new(AppError::ImportFailed {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            })
        })?;
    }
    app.engine.load_model(app.model_name.clone()).context("failed to start model load")?;
    Ok(app)
}

// ---------------------------------------------------------------------------
// TUI event loop
// ---------------------------------------------------------------------------

pub async fn run_tui(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init().map_err(|err| {
        tracing::error!("terminal init failed: {err}");
        anyhow::Error::new(AppError::TerminalUnavailable)
    })?;

    // Enable bracketed paste and mouse capture (ignore error on unsupported terminals)
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::EnableBracketedPaste,
        crossterm::event::EnableMouseCapture,
    );

    let result = event_loop(app, &mut terminal).await;

    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableBracketedPaste,
        crossterm::event::DisableMouseCapture,
    );
    ratatui::restore();

    result
}

async fn event_loop(app: &mut App, terminal: &mut ratatui::DefaultTerminal) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut last_render = Instant::now();

    loop {
        // Phase 1: wait for at least one event or the next frame tick
        let time_to_next = FRAME_INTERVAL.saturating_sub(last_render.elapsed());
        tokio::select! {
            Some(Ok(event)) = events.next() => handle_terminal_event(app, event),
            Some(event) = app.event_rx.recv() => handle_engine_event(app, event),
            () = tokio::time::sleep(time_to_next) => {}
        }

        // Phase 2: drain all remaining queued events (non-blocking)
        loop {
            // Try terminal events first (keeps typing responsive)
            if let Some(Some(Ok(event))) = events.next().now_or_never() {
                handle_terminal_event(app, event);
                continue;
            }
            match app.event_rx.try_recv() {
                Ok(event) => handle_engine_event(app, event),
                Err(_) => break,
            }
        }

        if app.should_quit {
            break;
        }

        // Phase 3: one viewport sync and one render per frame
        app.sync_viewport();
        if app.is_generating() || app.engine_loading {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
        }
        app.expire_notice(Instant::now());
        if app.force_redraw {
            terminal.clear()?;
            app.force_redraw = false;
        }
        terminal.draw(|f| crate::ui::render(f, app))?;
        last_render = Instant::now();
    }

    // Leave no generation running behind a closed UI.
    if app.is_generating() {
        let _ = app.engine.stop();
    }
    Ok(())
}
