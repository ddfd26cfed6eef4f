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

use super::{ActiveGeneration, App, Overlay};
use crate::conversation::{
    ConversationId, ConversationSource as _, Message, Role, default_export_path,
};
use crate::engine::GenerationRequest;
use crate::ui::theme::ThemeMode;
use crate::viewport::row_options;
use std::path::PathBuf;

/// Header action bar entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    ToggleTheme,
    Export,
    Import,
    Share,
    Settings,
    Shortcuts,
    TogglePin,
}

/// Which header actions are shown this frame. Derived once per frame from
/// the active conversation and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderActions {
    pub theme: ThemeMode,
    pub show_export: bool,
    pub show_import: bool,
    pub show_share: bool,
    pub show_shortcuts: bool,
    pub show_pin: bool,
    pub pinned: bool,
}

impl HeaderActions {
    #[must_use]
    pub fn derive(app: &App) -> Self {
        let conversation = app.store.active();
        let has_conversation = conversation.is_some();
        Self {
            theme: app.theme,
            show_export: has_conversation,
            show_import: has_conversation,
            show_share: has_conversation,
            show_shortcuts: app.config.show_shortcuts,
            show_pin: has_conversation,
            pinned: conversation.is_some_and(|c| c.pinned),
        }
    }

    pub fn visible(&self) -> Vec<HeaderAction> {
        [
            (HeaderAction::ToggleTheme, true),
            (HeaderAction::Export, self.show_export),
            (HeaderAction::Import, self.show_import),
            (HeaderAction::Share, self.show_share),
            (HeaderAction::Settings, true),
            (HeaderAction::Shortcuts, self.show_shortcuts),
            (HeaderAction::TogglePin, self.show_pin),
        ]
        .into_iter()
        .filter_map(|(action, shown)| shown.then_some(action))
        .collect()
    }
}

pub fn run_header_action(app: &mut App, action: HeaderAction) {
    match action {
        HeaderAction::ToggleTheme => toggle_theme(app),
        HeaderAction::Export => export_conversation(app),
        HeaderAction::Import => import_conversation(app),
        HeaderAction::Share => share_conversation(app),
        HeaderAction::Settings => toggle_overlay(app, Overlay::Settings),
        HeaderAction::Shortcuts => toggle_overlay(app, Overlay::Shortcuts),
        HeaderAction::TogglePin => toggle_pin(app),
    }
}

/// Send the typed prompt: append the user turn plus an empty assistant turn
/// and start streaming into the latter.
pub fn submit_input(app: &mut App) {
    if app.input.is_blank() {
        return;
    }
    if app.is_generating() {
        app.notify_error("Wait for the current reply to finish, or press Esc to stop it");
        return;
    }
    if !app.gate().is_model_ready {
        let status = app.engine_status.label();
        app.notify_error(format!("Model is {status}; try again once it is ready"));
        return;
    }

    let text = app.input.take();
    let conversation_id = app.store.ensure_active();
    app.store.push_message(&conversation_id, Message::new(Role::User, text));
    start_generation(app, conversation_id);
}

/// Guarded by the same derivation the viewport uses for the regenerate
/// affordance, so it is a no-op whenever the control is not shown.
pub fn regenerate_last_response(app: &mut App) -> bool {
    if app.is_generating() {
        tracing::debug!("regenerate ignored: a reply is still streaming");
        return false;
    }
    let gate = app.gate();
    let Some(conversation) = app.store.active() else {
        return false;
    };
    let allowed = conversation
        .last_message()
        .is_some_and(|m| row_options(m.role, true, gate).show_regenerate);
    if !allowed {
        tracing::debug!("regenerate ignored: affordance not available");
        return false;
    }

    let conversation_id = conversation.id.clone();
    if let Some(dropped) = app.store.remove_last_assistant(&conversation_id) {
        app.line_cache.forget(&dropped.id);
    }
    start_generation(app, conversation_id);
    true
}

/// Fire-and-forget stop. `is_generating` only flips once the engine reports
/// the generation as finished, stopped or failed.
pub fn stop_generation(app: &mut App) -> bool {
    let gate = app.gate();
    let allowed = app
        .store
        .active()
        .and_then(|c| c.last_message())
        .is_some_and(|m| row_options(m.role, true, gate).show_stop);
    if !allowed {
        tracing::debug!("stop ignored: affordance not available");
        return false;
    }
    if let Err(err) = app.engine.stop() {
        app.notify_error(format!("Failed to stop generation: {err}"));
        return false;
    }
    true
}

pub fn reload_model(app: &mut App) {
    if app.is_generating() {
        app.notify_error("Stop the current reply before reloading the model");
        return;
    }
    let model = app.model_name.clone();
    if let Err(err) = app.engine.load_model(model) {
        app.notify_error(format!("Failed to load model: {err}"));
    }
}

/// Conversation switches are refused while a reply streams, so the
/// conversation on screen is always the one being generated into.
pub fn new_conversation(app: &mut App) -> bool {
    if app.is_generating() {
        app.notify_error("Stop the current reply before starting a new chat");
        return false;
    }
    let id = app.store.create();
    app.line_cache.clear();
    tracing::info!(conversation = %id, "new conversation");
    true
}

pub fn cycle_conversation(app: &mut App, forward: bool) -> bool {
    if app.is_generating() {
        app.notify_error("Stop the current reply before switching chats");
        return false;
    }
    let Some(id) = app.store.cycle(forward) else {
        return false;
    };
    app.line_cache.clear();
    tracing::debug!(conversation = %id, "switched conversation");
    true
}

fn start_generation(app: &mut App, conversation_id: ConversationId) {
    let history = app
        .store
        .get_conversation(&conversation_id)
        .map(|c| c.messages.clone())
        .unwrap_or_default();
    let Some(message_id) =
        app.store.push_message(&conversation_id, Message::new(Role::Assistant, ""))
    else {
        return;
    };

    let request = GenerationRequest {
        conversation_id: conversation_id.clone(),
        message_id: message_id.clone(),
        history,
    };
    match app.engine.generate(request) {
        Ok(()) => {
            tracing::info!(
                conversation = %conversation_id,
                message = %message_id,
                "generation started"
            );
            app.generation = Some(ActiveGeneration { conversation_id, message_id });
            app.viewport.scroll_to_bottom();
        }
        Err(err) => app.notify_error(format!("Failed to start generation: {err}")),
    }
}

fn toggle_theme(app: &mut App) {
    app.theme = app.theme.toggled();
    app.line_cache.clear();
}

fn toggle_overlay(app: &mut App, overlay: Overlay) {
    app.overlay = if app.overlay == overlay { Overlay::None } else { overlay };
}

fn toggle_pin(app: &mut App) {
    let Some(id) = app.store.active_id().cloned() else {
        return;
    };
    if let Some(pinned) = app.store.toggle_pin(&id) {
        app.notify_info(if pinned { "Conversation pinned" } else { "Conversation unpinned" });
    }
}

fn export_path(app: &App, id: &ConversationId) -> Option<PathBuf> {
    match &app.config.export_dir {
        Some(dir) => Some(dir.join(format!("{id}.json"))),
        None => default_export_path(id),
    }
}

fn export_conversation(app: &mut App) {
    let Some(id) = app.store.active_id().cloned() else {
        return;
    };
    let Some(path) = export_path(app, &id) else {
        app.notify_error("No data directory available for exports");
        return;
    };
    match app.store.export_to(&id, &path) {
        Ok(()) => app.notify_info(format!("Exported to {}", path.display())),
        Err(err) => app.notify_error(format!("Export failed: {err:#}")),
    }
}

/// Imports from the path typed into the input box.
fn import_conversation(app: &mut App) {
    if app.is_generating() {
        app.notify_error("Stop the current reply before importing");
        return;
    }
    if app.input.is_blank() {
        app.notify_error("Type the path of an exported conversation, then import");
        return;
    }
    let path = PathBuf::from(app.input.text().trim());
    match app.store.import_from(&path) {
        Ok(_) => {
            app.input.take();
            app.notify_info(format!("Imported {}", path.display()));
        }
        Err(err) => app.notify_error(format!("Import failed: {err:#}")),
    }
}

fn share_conversation(app: &mut App) {
    let Some(transcript) = app.store.active_id().and_then(|id| app.store.transcript(id)) else {
        return;
    };
    let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(transcript));
    match copied {
        Ok(()) => app.notify_info("Transcript copied to clipboard"),
        Err(err) => app.notify_error(format!("Clipboard unavailable: {err}")),
    }
}
