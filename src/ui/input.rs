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

use crate::app::App;
use crate::ui::theme;
use crate::viewport::GatePhase;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Horizontal padding to match header/footer inset.
const INPUT_PAD: u16 = 2;

/// Prompt prefix width: "❯ " = 2 columns
const PROMPT_WIDTH: u16 = 2;

/// Maximum input area height (lines) to prevent the input from consuming the entire screen.
const MAX_INPUT_HEIGHT: u16 = 12;

fn placeholder(app: &App) -> &'static str {
    match app.gate().phase() {
        GatePhase::Generating => "Generating\u{2026} press Esc to stop",
        GatePhase::NotReady => "Waiting for the model to load\u{2026}",
        GatePhase::Idle => "Type a message...",
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let padded = Rect {
        x: area.x + INPUT_PAD,
        y: area.y,
        width: area.width.saturating_sub(INPUT_PAD * 2),
        height: area.height,
    };
    let palette = app.theme.palette();
    let prompt =
        Span::styled(format!("{} ", theme::PROMPT_CHAR), Style::default().fg(palette.accent));

    if app.input.text().is_empty() {
        let line = Line::from(vec![
            prompt,
            Span::styled(placeholder(app), Style::default().fg(palette.dim)),
        ]);
        frame.render_widget(Paragraph::new(line), padded);
        frame.set_cursor_position((padded.x + PROMPT_WIDTH, padded.y));
        return;
    }

    // Prompt on the first line, continuation lines indented to match
    let lines: Vec<Line> = app
        .input
        .text()
        .split('\n')
        .enumerate()
        .map(|(row, text)| {
            let prefix = if row == 0 { prompt.clone() } else { Span::raw("  ") };
            let body = Span::styled(text.to_owned(), Style::default().fg(palette.text));
            Line::from(vec![prefix, body])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), padded);

    let content_width = usize::from(padded.width.saturating_sub(PROMPT_WIDTH));
    if content_width == 0 {
        return;
    }
    let (cursor_row, cursor_col) = app.input.cursor_row_col();
    let mut visual_row = 0usize;
    for (row, line) in app.input.text().split('\n').enumerate() {
        if row == cursor_row {
            let col_width: usize =
                line.chars().take(cursor_col).map(|c| c.width().unwrap_or(0)).sum();
            let x = padded.x + PROMPT_WIDTH + (col_width % content_width) as u16;
            let y = padded.y + (visual_row + col_width / content_width) as u16;
            if x < padded.right() && y < padded.bottom() {
                frame.set_cursor_position((x, y));
            }
            return;
        }
        visual_row += wrapped_rows(line, content_width);
    }
}

fn wrapped_rows(line: &str, content_width: usize) -> usize {
    (line.width() / content_width + 1).max(1)
}

/// Number of visual lines the input occupies, accounting for wrapping.
#[allow(clippy::cast_possible_truncation)]
pub fn visual_line_count(app: &App, area_width: u16) -> u16 {
    if app.input.text().is_empty() {
        return 1;
    }
    let content_width =
        usize::from(area_width.saturating_sub(INPUT_PAD * 2).saturating_sub(PROMPT_WIDTH));
    if content_width == 0 {
        return (app.input.line_count() as u16).min(MAX_INPUT_HEIGHT);
    }
    let total: usize =
        app.input.text().split('\n').map(|line| wrapped_rows(line, content_width)).sum();
    (total.min(usize::from(MAX_INPUT_HEIGHT))) as u16
}
