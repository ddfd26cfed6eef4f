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

use crate::app::{App, HeaderAction, HeaderActions};
use crate::engine::EngineStatus;
use crate::ui::theme::{self, Palette};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

const HEADER_PAD: u16 = 2;
const ACTION_GAP: u16 = 1;

fn action_label(action: HeaderAction, actions: &HeaderActions) -> String {
    match action {
        HeaderAction::ToggleTheme => format!("[{}]", actions.theme.toggled().label()),
        HeaderAction::Export => "[Export]".to_owned(),
        HeaderAction::Import => "[Import]".to_owned(),
        HeaderAction::Share => "[Share]".to_owned(),
        HeaderAction::Settings => "[Settings]".to_owned(),
        HeaderAction::Shortcuts => "[?]".to_owned(),
        HeaderAction::TogglePin if actions.pinned => "[Unpin]".to_owned(),
        HeaderAction::TogglePin => "[Pin]".to_owned(),
    }
}

fn status_span(app: &App, palette: Palette) -> Span<'static> {
    if app.engine_loading {
        let ch = theme::spinner_char(app.spinner_frame);
        return Span::styled(format!("{ch} loading"), Style::default().fg(palette.loading));
    }
    let color = match app.engine_status {
        EngineStatus::Ready => palette.ready,
        EngineStatus::Loading => palette.loading,
        EngineStatus::Error => palette.error,
        EngineStatus::Idle => palette.dim,
    };
    Span::styled(format!("\u{25CF} {}", app.engine_status.label()), Style::default().fg(color))
}

/// Lay the action bar out right-aligned in `area`. Actions that do not fit
/// are dropped from the left.
#[allow(clippy::cast_possible_truncation)]
pub(super) fn layout_actions(
    area: Rect,
    actions: &HeaderActions,
) -> Vec<(HeaderAction, String, Rect)> {
    let mut placed = Vec::new();
    let mut right = area.right();
    for action in actions.visible().into_iter().rev() {
        let label = action_label(action, actions);
        let width = UnicodeWidthStr::width(label.as_str()) as u16;
        let gap = if placed.is_empty() { 0 } else { ACTION_GAP };
        if right.saturating_sub(area.x) < width + gap {
            break;
        }
        let x = right - gap - width;
        placed.push((action, label, Rect::new(x, area.y, width, 1)));
        right = x;
    }
    placed.reverse();
    placed
}

#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let padded = Rect {
        x: area.x + HEADER_PAD,
        y: area.y,
        width: area.width.saturating_sub(HEADER_PAD * 2),
        height: area.height,
    };
    let palette = app.theme.palette();
    let sep = Span::styled("  \u{2502}  ", Style::default().fg(palette.dim));

    let mut spans = vec![
        Span::styled(
            "localchat",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::styled("Model: ", Style::default().fg(palette.dim)),
        Span::styled(app.model_name.clone(), Style::default().fg(palette.text)),
        sep.clone(),
        status_span(app, palette),
    ];
    // Brand, model and status always win over actions; the title does not.
    let info_width = Line::from(spans.clone()).width() as u16;
    if let Some(conversation) = app.store.active() {
        let pin = if conversation.pinned { "\u{1F4CC} " } else { "" };
        spans.push(sep);
        spans.push(Span::styled(
            format!("{pin}{}", conversation.title),
            Style::default().fg(palette.dim),
        ));
    }

    let reserved = info_width.saturating_add(ACTION_GAP * 2).min(padded.width);
    let action_area =
        Rect { x: padded.x + reserved, width: padded.width - reserved, ..padded };
    let actions = HeaderActions::derive(app);
    let placed = layout_actions(action_area, &actions);

    let info_right = placed
        .first()
        .map_or(padded.right(), |(_, _, rect)| rect.x.saturating_sub(ACTION_GAP));
    let info_area = Rect { width: info_right.saturating_sub(padded.x), ..padded };
    frame.render_widget(Paragraph::new(Line::from(spans)), info_area);

    for (action, label, rect) in placed {
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(palette.accent))),
            rect,
        );
        app.header_action_areas.push((action, rect));
    }
}
