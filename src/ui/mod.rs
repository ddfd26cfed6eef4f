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

mod chat;
mod header;
mod help;
mod input;
mod layout;
mod markdown;
mod message;
pub mod theme;

pub use message::LineCache;

use crate::app::{App, NoticeKind};
use crate::ui::theme::Palette;
use crate::viewport::GatePhase;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render(frame: &mut Frame, app: &mut App) {
    let frame_area = frame.area();
    let help_height = help::compute_height(app);
    let input_lines = input::visual_line_count(app, frame_area.width);
    let areas = layout::compute(frame_area, input_lines, help_height);
    let palette = app.theme.palette();

    app.header_action_areas.clear();
    if areas.header.height > 0 {
        header::render(frame, areas.header, app);
        render_separator(frame, areas.header_sep, palette);
    }

    chat::render(frame, areas.body, app);

    render_separator(frame, areas.input_sep, palette);
    input::render(frame, areas.input, app);
    render_separator(frame, areas.input_bottom_sep, palette);

    if areas.overlay.height > 0 {
        help::render(frame, areas.overlay, app);
    }

    if let Some(footer_area) = areas.footer {
        render_footer(frame, footer_area, app, palette);
    }
}

const FOOTER_PAD: u16 = 2;
const FOOTER_COLUMN_GAP: u16 = 1;

fn render_footer(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let padded = Rect {
        x: area.x + FOOTER_PAD,
        y: area.y,
        width: area.width.saturating_sub(FOOTER_PAD * 2),
        height: area.height,
    };

    let left = match &app.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => palette.accent,
                NoticeKind::Error => palette.error,
            };
            Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)))
        }
        None if app.config.show_shortcuts => Line::from(vec![
            Span::styled("?", Style::default().fg(palette.text)),
            Span::styled(" : Shortcuts", Style::default().fg(palette.dim)),
        ]),
        None => Line::default(),
    };

    let (left_area, right_area) = split_footer_columns(padded);
    frame.render_widget(Paragraph::new(left), left_area);
    let (right_text, right_color) = footer_status(app, palette);
    render_footer_right_info(frame, right_area, &right_text, right_color);
}

/// Conversation position and generation phase, e.g. `Chat 2/3 | idle`.
fn footer_status(app: &App, palette: Palette) -> (String, Color) {
    let position =
        app.store.active_index().map(|index| format!("Chat {}/{}", index + 1, app.store.len()));
    let (phase, color) = match app.gate().phase() {
        GatePhase::Generating => {
            let ch = theme::spinner_char(app.spinner_frame);
            (format!("{ch} generating"), palette.accent)
        }
        GatePhase::NotReady => ("model not ready".to_owned(), palette.loading),
        GatePhase::Idle => ("idle".to_owned(), palette.dim),
    };
    let text = match position {
        Some(position) => format!("{position} | {phase}"),
        None => phase,
    };
    (text, color)
}

fn split_footer_columns(area: Rect) -> (Rect, Rect) {
    if area.width == 0 {
        return (area, Rect { width: 0, ..area });
    }

    let gap = if area.width > 2 { FOOTER_COLUMN_GAP } else { 0 };
    let usable_width = area.width.saturating_sub(gap);
    let left_width = usable_width.saturating_add(1) / 2;
    let right_width = usable_width.saturating_sub(left_width);

    let left = Rect { width: left_width, ..area };
    let right = Rect {
        x: area.x.saturating_add(left_width).saturating_add(gap),
        width: right_width,
        ..area
    };
    (left, right)
}

fn fit_footer_right_text(text: &str, max_width: usize) -> Option<String> {
    if max_width == 0 || text.trim().is_empty() {
        return None;
    }

    if UnicodeWidthStr::width(text) <= max_width {
        return Some(text.to_owned());
    }

    if max_width <= 3 {
        return Some(".".repeat(max_width));
    }

    let mut fitted = String::new();
    let mut width: usize = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width.saturating_add(ch_width).saturating_add(3) > max_width {
            break;
        }
        fitted.push(ch);
        width = width.saturating_add(ch_width);
    }

    if fitted.is_empty() {
        return Some("...".to_owned());
    }
    fitted.push_str("...");
    Some(fitted)
}

fn render_footer_right_info(frame: &mut Frame, area: Rect, right_text: &str, right_color: Color) {
    if area.width == 0 {
        return;
    }
    let Some(fitted) = fit_footer_right_text(right_text, usize::from(area.width)) else {
        return;
    };

    let line = Line::from(Span::styled(fitted, Style::default().fg(right_color)));
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn render_separator(frame: &mut Frame, area: Rect, palette: Palette) {
    if area.height == 0 {
        return;
    }
    let sep_str = theme::SEPARATOR_CHAR.repeat(usize::from(area.width));
    let line = Line::from(Span::styled(sep_str, Style::default().fg(palette.dim)));
    frame.render_widget(Paragraph::new(line), area);
}
