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

use ratatui::layout::{Constraint, Layout, Rect};

pub struct AppLayout {
    pub header: Rect,
    pub header_sep: Rect,
    pub body: Rect,
    pub input_sep: Rect,
    pub input: Rect,
    pub input_bottom_sep: Rect,
    /// Shortcuts/settings panel (zero-height when no overlay is open).
    pub overlay: Rect,
    pub footer: Option<Rect>,
}

pub fn compute(area: Rect, input_lines: u16, overlay_height: u16) -> AppLayout {
    let input_height = input_lines.max(1);
    let zero = Rect::new(area.x, area.y, area.width, 0);

    if area.height < 8 {
        // Ultra-compact: no header, no footer, no overlay
        let [body, input, input_bottom_sep] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .areas(area);
        AppLayout {
            header: zero,
            header_sep: zero,
            body,
            input_sep: Rect::new(area.x, input.y, area.width, 0),
            input,
            input_bottom_sep,
            overlay: Rect::new(area.x, input_bottom_sep.bottom(), area.width, 0),
            footer: None,
        }
    } else {
        let [header, header_sep, body, input_sep, input, input_bottom_sep, overlay, footer] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(input_height),
                Constraint::Length(1),
                Constraint::Length(overlay_height),
                Constraint::Length(1),
            ])
            .areas(area);
        AppLayout {
            header,
            header_sep,
            body,
            input_sep,
            input,
            input_bottom_sep,
            overlay,
            footer: Some(footer),
        }
    }
}
