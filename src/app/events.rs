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

use super::keys::handle_key;
use super::{App, run_header_action};
use crate::engine::EngineEvent;
use crossterm::event::{Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

const MOUSE_SCROLL_LINES: usize = 3;

pub fn handle_terminal_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Paste(text) => app.input.insert_str(&text),
        // Resize is handled automatically by ratatui
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.viewport.scroll_up(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollDown => app.viewport.scroll_down(MOUSE_SCROLL_LINES),
        MouseEventKind::Down(MouseButton::Left) => {
            let at = Position::new(mouse.column, mouse.row);
            if app.scroll_button_area.is_some_and(|area| area.contains(at)) {
                app.viewport.scroll_to_bottom();
                return;
            }
            let hit = app
                .header_action_areas
                .iter()
                .find(|(_, area)| area.contains(at))
                .map(|(action, _)| *action);
            if let Some(action) = hit {
                run_header_action(app, action);
            }
        }
        _ => {}
    }
}

/// Apply one engine event. Events for a message other than the one being
/// generated are stale (e.g. tokens racing a regenerate) and are dropped.
pub fn handle_engine_event(app: &mut App, event: EngineEvent) {
    match event {
        EngineEvent::StatusChanged(status) => {
            tracing::debug!(status = status.label(), "engine status changed");
            app.engine_status = status;
        }
        EngineEvent::LoadingChanged(loading) => app.engine_loading = loading,
        EngineEvent::ModelLoaded { model } => {
            app.notify_info(format!("Model {model} ready"));
            app.model_name = model;
        }
        EngineEvent::Token { conversation_id, message_id, text } => {
            let current = app.generation.as_ref().is_some_and(|g| g.message_id == message_id);
            if !current || !app.store.append_to_message(&conversation_id, &message_id, &text) {
                tracing::debug!(message = %message_id, "dropping stale token");
            }
        }
        EngineEvent::GenerationFinished { message_id } => {
            if finish_generation(app, &message_id) {
                tracing::info!(message = %message_id, "generation finished");
            }
        }
        EngineEvent::GenerationStopped { message_id } => {
            if finish_generation(app, &message_id) {
                tracing::info!(message = %message_id, "generation stopped");
            }
        }
        EngineEvent::GenerationFailed { message_id, error } => {
            let matches = match (&message_id, &app.generation) {
                (Some(id), Some(active)) => &active.message_id == id,
                (None, Some(_)) => true,
                (_, None) => false,
            };
            if matches {
                app.generation = None;
            }
            app.notify_error(format!("Generation failed: {error}"));
        }
    }
}

fn finish_generation(app: &mut App, message_id: &crate::conversation::MessageId) -> bool {
    if app.generation.as_ref().is_some_and(|g| &g.message_id == message_id) {
        app.generation = None;
        true
    } else {
        tracing::debug!(message = %message_id, "ignoring completion for inactive generation");
        false
    }
}
