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

use super::{Conversation, ConversationId, ConversationSource, Message, MessageId, Role};
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const EXPORT_FORMAT_VERSION: u32 = 1;
const EXPORT_DIR_NAME: &str = "localchat";
const DEFAULT_TITLE: &str = "New chat";
const TITLE_MAX_CHARS: usize = 40;

/// On-disk envelope for exported conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedConversation {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub conversation: Conversation,
}

/// In-memory conversation collaborator. Owns every conversation; the
/// viewport only ever sees them through [`ConversationSource`].
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active: Option<usize>,
}

impl ConversationSource for ConversationStore {
    fn get_conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Create an empty conversation and make it active.
    pub fn create(&mut self) -> ConversationId {
        let conversation = Conversation::new(DEFAULT_TITLE);
        let id = conversation.id.clone();
        self.conversations.push(conversation);
        self.active = Some(self.conversations.len() - 1);
        tracing::debug!(conversation = %id, "created conversation");
        id
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active.and_then(|idx| self.conversations.get(idx))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active().map(|c| &c.id)
    }

    /// Return the active conversation, creating one if none exists yet.
    pub fn ensure_active(&mut self) -> ConversationId {
        match self.active_id() {
            Some(id) => id.clone(),
            None => self.create(),
        }
    }

    /// Move the active selection one step, wrapping at either end.
    pub fn cycle(&mut self, forward: bool) -> Option<ConversationId> {
        let count = self.conversations.len();
        if count == 0 {
            return None;
        }
        let current = self.active.unwrap_or(0);
        let next = if forward { (current + 1) % count } else { (current + count - 1) % count };
        self.active = Some(next);
        self.conversations.get(next).map(|c| c.id.clone())
    }

    pub fn push_message(&mut self, id: &ConversationId, message: Message) -> Option<MessageId> {
        let conversation = self.get_mut(id)?;
        if conversation.title == DEFAULT_TITLE && message.role == Role::User {
            conversation.title = derive_title(&message.content);
        }
        let message_id = message.id.clone();
        conversation.messages.push(message);
        Some(message_id)
    }

    /// Append streamed text to a message. Only the trailing assistant
    /// message accepts appends; anything else is rejected.
    pub fn append_to_message(
        &mut self,
        id: &ConversationId,
        message_id: &MessageId,
        text: &str,
    ) -> bool {
        let Some(last) = self.get_mut(id).and_then(|c| c.messages.last_mut()) else {
            return false;
        };
        if &last.id != message_id || last.role != Role::Assistant {
            tracing::warn!(message = %message_id, "dropping append to non-streaming message");
            return false;
        }
        last.content.push_str(text);
        true
    }

    /// Drop the trailing assistant message so it can be generated again.
    pub fn remove_last_assistant(&mut self, id: &ConversationId) -> Option<Message> {
        let conversation = self.get_mut(id)?;
        if conversation.messages.last().is_some_and(|m| m.role == Role::Assistant) {
            conversation.messages.pop()
        } else {
            None
        }
    }

    pub fn toggle_pin(&mut self, id: &ConversationId) -> Option<bool> {
        let conversation = self.get_mut(id)?;
        conversation.pinned = !conversation.pinned;
        Some(conversation.pinned)
    }

    pub fn export_to(&self, id: &ConversationId, path: &Path) -> anyhow::Result<()> {
        let conversation = self
            .get_conversation(id)
            .with_context(|| format!("conversation {id} not found"))?;
        let envelope = ExportedConversation {
            version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            conversation: conversation.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .context("failed to serialize conversation")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(conversation = %id, path = %path.display(), "exported conversation");
        Ok(())
    }

    /// Load an exported conversation and make it active. A conversation whose
    /// id is already present is imported under a fresh id.
    pub fn import_from(&mut self, path: &Path) -> anyhow::Result<ConversationId> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let envelope: ExportedConversation = serde_json::from_str(&content)
            .with_context(|| format!("{} is not an exported conversation", path.display()))?;
        if envelope.version > EXPORT_FORMAT_VERSION {
            anyhow::bail!(
                "{} uses export format v{}, newest supported is v{EXPORT_FORMAT_VERSION}",
                path.display(),
                envelope.version
            );
        }

        let mut conversation = envelope.conversation;
        if self.position(&conversation.id).is_some() {
            conversation.id = ConversationId::generate();
        }
        for message in &mut conversation.messages {
            if self.contains_message(&message.id) {
                message.id = MessageId::generate();
            }
        }
        let id = conversation.id.clone();
        self.conversations.push(conversation);
        self.active = Some(self.conversations.len() - 1);
        tracing::info!(conversation = %id, path = %path.display(), "imported conversation");
        Ok(id)
    }

    /// Markdown transcript used when sharing a conversation.
    pub fn transcript(&self, id: &ConversationId) -> Option<String> {
        let conversation = self.get_conversation(id)?;
        let mut out = format!("# {}\n", conversation.title);
        for message in &conversation.messages {
            out.push_str("\n**");
            out.push_str(message.role.label());
            out.push_str(":**\n\n");
            out.push_str(message.content.trim_end());
            out.push('\n');
        }
        Some(out)
    }

    fn contains_message(&self, id: &MessageId) -> bool {
        self.conversations.iter().flat_map(|c| &c.messages).any(|m| &m.id == id)
    }

    fn position(&self, id: &ConversationId) -> Option<usize> {
        self.conversations.iter().position(|c| &c.id == id)
    }

    fn get_mut(&mut self, id: &ConversationId) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| &c.id == id)
    }
}

/// Default export location: `<data dir>/localchat/<conversation id>.json`.
pub fn default_export_path(id: &ConversationId) -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(EXPORT_DIR_NAME).join(format!("{id}.json")))
}

fn derive_title(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return DEFAULT_TITLE.to_owned();
    }
    let mut title: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
    if first_line.chars().count() > TITLE_MAX_CHARS {
        title.push('\u{2026}');
    }
    title
}
