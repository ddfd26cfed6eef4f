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

use super::input::InputState;
use crate::conversation::{ConversationId, ConversationStore, MessageId};
use crate::engine::{EngineCommand, EngineEvent, EngineHandle, EngineStatus};
use crate::ui::theme::ThemeMode;
use crate::ui::LineCache;
use crate::viewport::{EngineSnapshot, GenerationGate, Viewport, ViewportProps};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Startup configuration resolved from the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub scroll_threshold: usize,
    pub show_shortcuts: bool,
    /// Directory exports are written to. `None` when no data dir is known.
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "scripted-demo".to_owned(),
            scroll_threshold: crate::viewport::DEFAULT_BOTTOM_THRESHOLD,
            show_shortcuts: true,
            export_dir: None,
        }
    }
}

/// The reply currently being streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGeneration {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient footer message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Shortcuts,
    Settings,
}

pub struct App {
    pub config: AppConfig,
    pub store: ConversationStore,
    pub viewport: Viewport,
    pub engine: EngineHandle,
    pub event_tx: mpsc::UnboundedSender<EngineEvent>,
    pub event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    pub engine_status: EngineStatus,
    pub engine_loading: bool,
    pub generation: Option<ActiveGeneration>,
    pub model_name: String,
    pub input: InputState,
    pub theme: ThemeMode,
    pub overlay: Overlay,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    /// Force a full terminal clear on next render frame.
    pub force_redraw: bool,
    pub spinner_frame: usize,
    /// Rendered lines of finalized messages, keyed by message id.
    pub line_cache: LineCache,
    /// Click target of the scroll-to-bottom control, when it is shown.
    pub scroll_button_area: Option<Rect>,
    /// Click targets of the header action bar.
    pub header_action_areas: Vec<(super::HeaderAction, Rect)>,
}

impl App {
    #[must_use]
    pub fn new(
        config: AppConfig,
        engine: EngineHandle,
        event_tx: mpsc::UnboundedSender<EngineEvent>,
        event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> Self {
        Self {
            viewport: Viewport::new(config.scroll_threshold),
            model_name: config.model.clone(),
            config,
            store: ConversationStore::new(),
            engine,
            event_tx,
            event_rx,
            engine_status: EngineStatus::Idle,
            engine_loading: false,
            generation: None,
            input: InputState::new(),
            theme: ThemeMode::Dark,
            overlay: Overlay::None,
            notice: None,
            should_quit: false,
            force_redraw: false,
            spinner_frame: 0,
            line_cache: LineCache::default(),
            scroll_button_area: None,
            header_action_areas: Vec::new(),
        }
    }

    /// An `App` wired to plain channels instead of a running engine.
    /// Returns the command receiver so callers can see what was sent.
    #[doc(hidden)]
    pub fn test_default() -> (Self, mpsc::UnboundedReceiver<EngineCommand>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = EngineHandle::new(command_tx);
        let app = Self::new(AppConfig::default(), engine, event_tx, event_rx);
        (app, command_rx)
    }

    /// True while any reply is streaming, whichever conversation it is in.
    pub fn is_generating(&self) -> bool {
        self.generation.is_some()
    }

    /// True only when the streaming reply belongs to the conversation on
    /// screen. Stop and the streaming indicator attach to this one alone.
    pub fn is_generating_active(&self) -> bool {
        self.generation
            .as_ref()
            .is_some_and(|g| self.store.active_id() == Some(&g.conversation_id))
    }

    pub fn engine_snapshot(&self) -> EngineSnapshot {
        EngineSnapshot { status: self.engine_status, is_loading: self.engine_loading }
    }

    pub fn viewport_props(&self) -> ViewportProps {
        ViewportProps {
            is_loading: self.engine_loading,
            is_generating: self.is_generating_active(),
        }
    }

    pub fn gate(&self) -> GenerationGate {
        GenerationGate::derive(self.engine_snapshot(), self.is_generating_active())
    }

    /// Hand the settled state of this update cycle to the viewport.
    pub fn sync_viewport(&mut self) {
        let props = self.viewport_props();
        self.viewport.sync(self.store.active(), props);
    }

    pub fn notify_info(&mut self, text: impl Into<String>) {
        self.set_notice(text.into(), NoticeKind::Info);
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!("{text}");
        self.set_notice(text, NoticeKind::Error);
    }

    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
        }
    }

    fn set_notice(&mut self, text: String, kind: NoticeKind) {
        self.notice = Some(Notice { text, kind, expires_at: Instant::now() + NOTICE_TTL });
    }
}
