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

use super::{EngineCommand, EngineEvent, EngineHandle, EngineStatus, GenerationRequest};
use crate::conversation::{MessageId, Role};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Prompts containing this marker make the scripted engine fail mid-reply.
pub const FAIL_TRIGGER: &str = "/fail";

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Simulated model load time.
    pub load_delay: Duration,
    /// Pause between streamed tokens.
    pub token_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { load_delay: Duration::from_millis(400), token_delay: Duration::from_millis(30) }
    }
}

struct ActiveGeneration {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveGeneration {
    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Spawn the scripted engine task and return its command handle.
/// The task exits once every handle is dropped.
pub fn spawn_engine(
    config: EngineConfig,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
) -> EngineHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    tokio::spawn(run(config, command_rx, event_tx));
    EngineHandle::new(command_tx)
}

async fn run(
    config: EngineConfig,
    mut command_rx: mpsc::UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
) {
    let mut status = EngineStatus::Idle;
    let mut active: Option<ActiveGeneration> = None;

    while let Some(command) = command_rx.recv().await {
        match command {
            EngineCommand::LoadModel { model } => {
                if let Some(generation) = active.take() {
                    generation.cancel.cancel();
                }
                tracing::info!(%model, "loading model");
                let _ = event_tx.send(EngineEvent::LoadingChanged(true));
                status = EngineStatus::Loading;
                let _ = event_tx.send(EngineEvent::StatusChanged(status));
                tokio::time::sleep(config.load_delay).await;
                status = EngineStatus::Ready;
                let _ = event_tx.send(EngineEvent::StatusChanged(status));
                let _ = event_tx.send(EngineEvent::ModelLoaded { model });
                let _ = event_tx.send(EngineEvent::LoadingChanged(false));
            }
            EngineCommand::Generate(request) => {
                if status != EngineStatus::Ready {
                    let _ = event_tx.send(EngineEvent::GenerationFailed {
                        message_id: Some(request.message_id),
                        error: format!("model is {}", status.label()),
                    });
                    continue;
                }
                if active.as_ref().is_some_and(ActiveGeneration::is_running) {
                    let _ = event_tx.send(EngineEvent::GenerationFailed {
                        message_id: Some(request.message_id),
                        error: "a generation is already running".to_owned(),
                    });
                    continue;
                }
                let cancel = CancellationToken::new();
                let task = tokio::spawn(stream_reply(
                    request,
                    cancel.clone(),
                    event_tx.clone(),
                    config.token_delay,
                ));
                active = Some(ActiveGeneration { cancel, task });
            }
            EngineCommand::Stop => match active.as_ref() {
                Some(generation) if generation.is_running() => generation.cancel.cancel(),
                _ => tracing::debug!("stop requested with no generation running"),
            },
        }
    }

    if let Some(generation) = active {
        generation.cancel.cancel();
    }
    tracing::debug!("engine command channel closed");
}

async fn stream_reply(
    request: GenerationRequest,
    cancel: CancellationToken,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    token_delay: Duration,
) {
    let GenerationRequest { conversation_id, message_id, history } = request;
    let prompt = history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map_or("", |m| m.content.as_str());
    let reply = compose_reply(prompt);
    let tokens: Vec<&str> = reply.split_inclusive(' ').collect();
    let fail_at = prompt.contains(FAIL_TRIGGER).then_some(tokens.len() / 2);

    tracing::debug!(message = %message_id, tokens = tokens.len(), "streaming reply");
    for (i, token) in tokens.iter().enumerate() {
        if fail_at == Some(i) {
            let _ = event_tx.send(failed(&message_id, "scripted failure requested"));
            return;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = event_tx.send(EngineEvent::GenerationStopped { message_id });
                return;
            }
            () = tokio::time::sleep(token_delay) => {}
        }
        let sent = event_tx.send(EngineEvent::Token {
            conversation_id: conversation_id.clone(),
            message_id: message_id.clone(),
            text: (*token).to_owned(),
        });
        if sent.is_err() {
            return;
        }
    }
    let _ = event_tx.send(EngineEvent::GenerationFinished { message_id });
}

fn failed(message_id: &MessageId, error: &str) -> EngineEvent {
    EngineEvent::GenerationFailed { message_id: Some(message_id.clone()), error: error.to_owned() }
}

fn compose_reply(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return "There is nothing to answer yet. Type a message and press Enter.".to_owned();
    }
    let words = prompt.split_whitespace().count();
    format!(
        "You wrote {words} word{plural}:\n\n> {quoted}\n\n\
         This reply comes from the scripted engine, which streams canned text one \
         token at a time so the conversation view can be exercised without a real \
         model. Scroll up while it is streaming and the view stays where you left it; \
         press Ctrl+End to jump back to the newest output.\n\n\
         - Esc stops the reply in progress\n\
         - Ctrl+R regenerates the last reply once the model is idle\n\
         - F5 reloads the model\n",
        plural = if words == 1 { "" } else { "s" },
        quoted = prompt.replace('\n', "\n> "),
    )
}
