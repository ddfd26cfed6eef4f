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

use crate::app::{App, Overlay};
use crate::conversation::default_export_path;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const COLUMN_GAP: usize = 4;
const MAX_ROWS: usize = 10;

type Item = (String, String);

fn columns(app: &App) -> usize {
    if app.overlay == Overlay::Settings { 1 } else { 2 }
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_height(app: &App) -> u16 {
    let items = build_items(app);
    if items.is_empty() {
        return 0;
    }
    let rows = items.len().div_ceil(columns(app)).min(MAX_ROWS) as u16;
    // Border top + bottom.
    rows.saturating_add(2)
}

#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let items = build_items(app);
    if items.is_empty() {
        return;
    }
    let palette = app.theme.palette();
    let cols = columns(app);
    let rows = items.len().div_ceil(cols).min(MAX_ROWS);
    let inner_width = usize::from(area.width.saturating_sub(2));
    let col_width = inner_width.saturating_sub(COLUMN_GAP * (cols - 1)) / cols;

    let table_rows: Vec<Row<'static>> = (0..rows)
        .map(|row| {
            let cells: Vec<Cell<'static>> = (0..cols)
                .map(|col| {
                    let item = items.get(row + col * rows).cloned().unwrap_or_default();
                    Cell::from(format_item_cell(&item, col_width, palette.dim))
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let title = match app.overlay {
        Overlay::Settings => " Settings ",
        Overlay::Shortcuts | Overlay::None => " Shortcuts ",
    };
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let widths = vec![Constraint::Length(col_width as u16); cols];
    let table = Table::new(table_rows, widths).column_spacing(COLUMN_GAP as u16).block(block);
    frame.render_widget(table, area);
}

fn build_items(app: &App) -> Vec<Item> {
    match app.overlay {
        Overlay::None => Vec::new(),
        Overlay::Shortcuts => shortcut_items(),
        Overlay::Settings => settings_items(app),
    }
}

fn shortcut_items() -> Vec<Item> {
    [
        ("Enter", "Send message"),
        ("Shift+Enter", "Insert newline"),
        ("Esc", "Stop generating"),
        ("Ctrl+R", "Regenerate last reply"),
        ("F5", "Reload model"),
        ("Ctrl+N", "New conversation"),
        ("Alt+Left/Right", "Switch conversation"),
        ("Ctrl+P", "Pin conversation"),
        ("Ctrl+E", "Export to JSON"),
        ("Ctrl+O", "Import typed path"),
        ("Ctrl+S", "Copy transcript"),
        ("Ctrl+T", "Toggle theme"),
        ("PageUp/PageDown", "Scroll by page"),
        ("Ctrl+Up/Down", "Scroll by line"),
        ("Ctrl+Home/End", "Oldest / latest"),
        ("Mouse wheel", "Scroll chat"),
        ("F2", "Settings"),
        ("Ctrl+L", "Redraw screen"),
        ("Ctrl+C", "Quit"),
    ]
    .into_iter()
    .map(|(key, desc)| (key.to_owned(), desc.to_owned()))
    .collect()
}

fn settings_items(app: &App) -> Vec<Item> {
    let export_target = app
        .store
        .active_id()
        .and_then(|id| match &app.config.export_dir {
            Some(dir) => Some(dir.clone()),
            None => default_export_path(id).and_then(|p| p.parent().map(ToOwned::to_owned)),
        })
        .map_or_else(|| "-".to_owned(), |dir| dir.display().to_string());
    vec![
        ("Model".to_owned(), app.model_name.clone()),
        ("Engine".to_owned(), app.engine_status.label().to_owned()),
        ("Theme".to_owned(), app.theme.label().to_owned()),
        ("Scroll threshold".to_owned(), format!("{} row(s)", app.viewport.scroll().threshold())),
        ("Conversations".to_owned(), app.store.len().to_string()),
        ("Exports".to_owned(), export_target),
    ]
}

fn format_item_cell(item: &Item, width: usize, dim: ratatui::style::Color) -> Line<'static> {
    let (label, desc) = item;
    if label.is_empty() && desc.is_empty() {
        return Line::default();
    }
    let label_width = UnicodeWidthStr::width(label.as_str());
    let sep = " : ";
    let desc_width = width.saturating_sub(label_width + UnicodeWidthStr::width(sep));

    let mut spans: Vec<Span<'static>> = vec![
        Span::styled(
            truncate_to_width(label, width),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(sep.to_owned(), Style::default().fg(dim)),
    ];
    if !desc.is_empty() && desc_width > 0 {
        spans.push(Span::raw(truncate_to_width(desc, desc_width)));
    }
    Line::from(spans)
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_owned();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn closed_overlay_takes_no_space() {
        let (app, _rx) = App::test_default();
        assert_eq!(compute_height(&app), 0);
    }

    #[test]
    fn shortcuts_use_two_columns() {
        let (mut app, _rx) = App::test_default();
        app.overlay = Overlay::Shortcuts;
        let rows = shortcut_items().len().div_ceil(2).min(MAX_ROWS);
        assert_eq!(compute_height(&app), rows as u16 + 2);
    }

    #[test]
    fn settings_list_threshold_and_theme() {
        let (mut app, _rx) = App::test_default();
        app.overlay = Overlay::Settings;
        let items = settings_items(&app);
        assert!(items.contains(&("Theme".to_owned(), "dark".to_owned())));
        assert!(items.contains(&("Scroll threshold".to_owned(), "1 row(s)".to_owned())));
        assert_eq!(compute_height(&app), items.len() as u16 + 2);
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("日本語", 4), "日本");
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }
}
