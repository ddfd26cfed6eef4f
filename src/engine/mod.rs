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

//! The generation collaborator. The UI only talks to it through
//! [`EngineHandle`] commands and only observes it through [`EngineEvent`]s.

mod scripted;

pub use scripted::{EngineConfig, FAIL_TRIGGER, spawn_engine};

use crate::conversation::{ConversationId, Message, MessageId};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// No model loaded yet.
    Idle,
    Loading,
    Ready,
    Error,
}

impl EngineStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub conversation_id: ConversationId,
    /// The (empty) assistant message the reply streams into.
    pub message_id: MessageId,
    /// Everything before the reply, in turn order.
    pub history: Vec<Message>,
}

#[derive(Debug)]
pub enum EngineCommand {
    LoadModel { model: String },
    Generate(GenerationRequest),
    Stop,
}

/// Events pushed from the engine task to the App/UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StatusChanged(EngineStatus),
    LoadingChanged(bool),
    ModelLoaded { model: String },
    /// Streamed reply text, appended to the message in order.
    Token { conversation_id: ConversationId, message_id: MessageId, text: String },
    GenerationFinished { message_id: MessageId },
    /// A stop request was honored.
    GenerationStopped { message_id: MessageId },
    GenerationFailed { message_id: Option<MessageId>, error: String },
}

/// Fire-and-forget command sender. Sending never waits for the engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    #[must_use]
    pub fn new(command_tx: mpsc::UnboundedSender<EngineCommand>) -> Self {
        Self { command_tx }
    }

    pub fn load_model(&self, model: impl Into<String>) -> anyhow::Result<()> {
        self.send(EngineCommand::LoadModel { model: model.into() })
    }

    pub fn generate(&self, request: GenerationRequest) -> anyhow::Result<()> {
        self.send(EngineCommand::Generate(request))
    }

    pub fn stop(&self) -> anyhow::Result<()> {
        self.send(EngineCommand::Stop)
    }

    fn send(&self, command: EngineCommand) -> anyhow::Result<()> {
        self.command_tx.send(command).map_err(|_| anyhow::anyhow!("engine command channel closed"))
    }
}
