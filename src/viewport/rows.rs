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

use super::gate::GenerationGate;
use crate::conversation::{Message, Role};

/// Per-row display options, derived once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowOptions {
    pub show_regenerate: bool,
    pub show_stop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDescriptor<'a> {
    pub index: usize,
    pub message: &'a Message,
    pub is_last: bool,
    pub options: RowOptions,
}

impl RowDescriptor<'_> {
    pub fn can_regenerate(&self) -> bool {
        self.options.show_regenerate
    }

    pub fn can_stop(&self) -> bool {
        self.options.show_stop
    }

    /// True while this row's content is still being streamed into.
    pub fn is_streaming(&self) -> bool {
        self.options.show_stop
    }
}

/// Placeholder shown for a conversation with nothing in it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody<'a> {
    /// No messages and nothing in flight.
    Placeholder(EmptyState),
    Rows(Vec<RowDescriptor<'a>>),
    /// No messages, but a load or generation is in progress.
    Blank,
}

impl ListBody<'_> {
    pub fn rows(&self) -> &[RowDescriptor<'_>] {
        match self {
            Self::Rows(rows) => rows,
            Self::Placeholder(_) | Self::Blank => &[],
        }
    }
}

/// Affordances only ever attach to the trailing assistant message.
#[must_use]
pub fn row_options(role: Role, is_last: bool, gate: GenerationGate) -> RowOptions {
    let eligible = role == Role::Assistant && is_last;
    RowOptions {
        show_regenerate: eligible && gate.is_model_ready && !gate.is_generating,
        show_stop: eligible && gate.is_generating,
    }
}

#[must_use]
pub fn build_rows<'a>(
    messages: &'a [Message],
    gate: GenerationGate,
    is_loading: bool,
    title: Option<&str>,
) -> ListBody<'a> {
    if messages.is_empty() {
        if is_loading || gate.is_generating {
            return ListBody::Blank;
        }
        return ListBody::Placeholder(EmptyState { title: title.map(str::to_owned) });
    }

    let last = messages.len() - 1;
    let rows = messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let is_last = index == last;
            let options = row_options(message.role, is_last, gate);
            RowDescriptor { index, message, is_last, options }
        })
        .collect();
    ListBody::Rows(rows)
}
