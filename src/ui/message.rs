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

use crate::conversation::{MessageId, Role};
use crate::ui::markdown;
use crate::ui::theme::{self, Palette, ThemeMode};
use crate::viewport::RowDescriptor;
use chrono::{DateTime, Local, Utc};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::collections::HashMap;

/// Frame-level inputs shared by every row.
#[derive(Debug, Clone, Copy)]
pub struct RowContext {
    pub spinner_frame: usize,
    pub theme: ThemeMode,
}

struct CachedLines {
    content_len: usize,
    theme: ThemeMode,
    lines: Vec<Line<'static>>,
}

/// Rendered markdown of settled messages, keyed by message id.
///
/// An entry is valid for the content length and theme it was rendered with.
/// Message content only ever grows, so a length change means it is stale.
#[derive(Default)]
pub struct LineCache {
    entries: HashMap<MessageId, CachedLines>,
}

impl LineCache {
    pub fn get(
        &self,
        id: &MessageId,
        content_len: usize,
        theme: ThemeMode,
    ) -> Option<&[Line<'static>]> {
        self.entries
            .get(id)
            .filter(|entry| entry.content_len == content_len && entry.theme == theme)
            .map(|entry| entry.lines.as_slice())
    }

    pub fn store(
        &mut self,
        id: MessageId,
        content_len: usize,
        theme: ThemeMode,
        lines: Vec<Line<'static>>,
    ) {
        self.entries.insert(id, CachedLines { content_len, theme, lines });
    }

    pub fn forget(&mut self, id: &MessageId) {
        self.entries.remove(id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render one message row, its affordance hints and a trailing blank line.
pub fn render_row(
    row: &RowDescriptor<'_>,
    ctx: RowContext,
    cache: &mut LineCache,
    out: &mut Vec<Line<'static>>,
) {
    let palette = ctx.theme.palette();
    let message = row.message;

    out.push(Line::from(vec![
        Span::styled(
            message.role.label(),
            Style::default().fg(role_color(message.role, palette)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" \u{00B7} {}", format_clock(message.created_at)),
            Style::default().fg(palette.dim),
        ),
    ]));

    let bg = (message.role == Role::User).then_some(palette.user_msg_bg);
    if row.is_streaming() {
        // Streaming content changes every token; never cache it.
        if !message.content.is_empty() {
            let text = preprocess_markdown(&message.content);
            out.extend(markdown::render_streaming_markdown(&text, bg));
        }
        let ch = theme::spinner_char(ctx.spinner_frame);
        out.push(Line::from(Span::styled(
            format!("{ch} Generating\u{2026} (Esc to stop)"),
            Style::default().fg(palette.dim),
        )));
    } else if message.content.is_empty() {
        if message.role == Role::Assistant {
            out.push(Line::from(Span::styled(
                "(no response)",
                Style::default().fg(palette.dim).add_modifier(Modifier::ITALIC),
            )));
        }
    } else {
        render_text_cached(row, ctx.theme, bg, cache, out);
    }

    if row.can_regenerate() {
        out.push(Line::from(Span::styled(
            "\u{21BB} Ctrl+R to regenerate",
            Style::default().fg(palette.dim),
        )));
    }

    // Blank separator between messages
    out.push(Line::default());
}

fn role_color(role: Role, palette: Palette) -> Color {
    match role {
        Role::User => palette.role_user,
        Role::Assistant => palette.role_assistant,
        Role::System => palette.role_system,
    }
}

/// `HH:MM` in the user's local timezone.
fn format_clock(created_at: DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%H:%M").to_string()
}

fn render_text_cached(
    row: &RowDescriptor<'_>,
    theme: ThemeMode,
    bg: Option<Color>,
    cache: &mut LineCache,
    out: &mut Vec<Line<'static>>,
) {
    let message = row.message;
    let len = message.content.len();
    if let Some(cached) = cache.get(&message.id, len, theme) {
        out.extend_from_slice(cached);
        return;
    }

    let mut text = preprocess_markdown(&message.content);
    if message.role == Role::User {
        text = force_markdown_line_breaks(&text);
    }
    let fresh = markdown::render_markdown_safe(&text, bg);
    out.extend_from_slice(&fresh);
    cache.store(message.id.clone(), len, theme, fresh);
}

/// Headings (`# Title`) become `**Title**` with a blank line before, since
/// `tui_markdown` renders them poorly. Lines inside code fences are left alone.
fn preprocess_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_fence = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence && trimmed.starts_with('#') {
            let content = trimmed.trim_start_matches('#').trim();
            if !content.is_empty() {
                if !result.is_empty() && !result.ends_with("\n\n") {
                    result.push('\n');
                }
                result.push_str("**");
                result.push_str(content);
                result.push_str("**\n");
                continue;
            }
        }
        result.push_str(line);
        result.push('\n');
    }
    if !text.ends_with('\n') {
        result.pop();
    }
    result
}

/// Convert single line breaks into hard breaks so user-entered newlines persist.
fn force_markdown_line_breaks(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if !line.is_empty() {
            out.push_str(line);
            out.push_str("  ");
        }
        if i + 1 < lines.len() || text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
