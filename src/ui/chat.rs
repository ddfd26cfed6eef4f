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
use crate::ui::message::{self, LineCache, RowContext};
use crate::ui::theme::Palette;
use crate::viewport::{EmptyState, ListBody, ScrollMetrics};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

const JUMP_LABEL: &str = " \u{2193} Jump to latest (Ctrl+End) ";
const JUMP_MARGIN: u16 = 1;

#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let props = app.viewport_props();
    let engine = app.engine_snapshot();
    let ctx = RowContext { spinner_frame: app.spinner_frame, theme: app.theme };
    let palette = app.theme.palette();
    let line_cache = &mut app.line_cache;

    // Laid out once inside the measure step and reused for drawing.
    let mut laid_out: Option<(Paragraph<'static>, usize)> = None;
    let view = app.viewport.render_pass(app.store.active(), props, engine, |body| {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let lines = body_lines(body, ctx, palette, line_cache);
        let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
        let content_height = paragraph.line_count(area.width);
        laid_out = Some((paragraph, content_height));
        Some(ScrollMetrics { content_height, viewport_height: usize::from(area.height) })
    });

    app.scroll_button_area = None;
    let Some((paragraph, content_height)) = laid_out else {
        return;
    };
    let viewport_height = usize::from(area.height);

    if matches!(view.body, ListBody::Placeholder(_)) {
        // Empty state sits in the middle of the viewport
        let top = viewport_height.saturating_sub(content_height) / 2;
        let render_area = Rect {
            y: area.y + top as u16,
            height: content_height.min(viewport_height) as u16,
            ..area
        };
        frame.render_widget(paragraph.alignment(Alignment::Center), render_area);
    } else if content_height <= viewport_height {
        // Short content: render in a bottom-aligned sub-rect (stacks above input)
        let top = (viewport_height - content_height) as u16;
        let render_area = Rect { y: area.y + top, height: content_height as u16, ..area };
        frame.render_widget(paragraph, render_area);
    } else {
        let offset = u16::try_from(view.offset).unwrap_or(u16::MAX);
        frame.render_widget(paragraph.scroll((offset, 0)), area);
    }

    if view.show_scroll_to_bottom {
        app.scroll_button_area = render_jump_control(frame, area, palette);
    }
}

fn body_lines(
    body: &ListBody<'_>,
    ctx: RowContext,
    palette: Palette,
    cache: &mut LineCache,
) -> Vec<Line<'static>> {
    match body {
        ListBody::Rows(rows) => {
            let mut out = Vec::new();
            for row in rows {
                message::render_row(row, ctx, cache, &mut out);
            }
            out
        }
        ListBody::Placeholder(empty) => empty_state_lines(empty, palette),
        ListBody::Blank => Vec::new(),
    }
}

fn empty_state_lines(empty: &EmptyState, palette: Palette) -> Vec<Line<'static>> {
    let heading = empty.title.clone().unwrap_or_else(|| "No conversation yet".to_owned());
    vec![
        Line::from(Span::styled(
            heading,
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Type a message below and press Enter to start.",
            Style::default().fg(palette.dim),
        )),
        Line::from(Span::styled(
            "Ctrl+N new chat \u{00B7} F1 shortcuts",
            Style::default().fg(palette.dim),
        )),
    ]
}

/// Draw the jump-to-latest control on the bottom row of `area`, right
/// aligned. Returns its click target, or `None` when it does not fit.
#[allow(clippy::cast_possible_truncation)]
fn render_jump_control(frame: &mut Frame, area: Rect, palette: Palette) -> Option<Rect> {
    let width = UnicodeWidthStr::width(JUMP_LABEL) as u16;
    if area.height == 0 || area.width < width + JUMP_MARGIN {
        return None;
    }
    let rect = Rect {
        x: area.right() - width - JUMP_MARGIN,
        y: area.bottom() - 1,
        width,
        height: 1,
    };
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(Span::styled(
            JUMP_LABEL,
            Style::default().fg(palette.accent).add_modifier(Modifier::REVERSED),
        )),
        rect,
    );
    Some(rect)
}
