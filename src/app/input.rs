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

/// Multi-line prompt buffer with a character cursor.
#[derive(Debug, Default)]
pub struct InputState {
    text: String,
    /// Cursor position in chars, `0..=text.chars().count()`.
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Take the buffer contents, leaving it empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            // Normalize pasted CRLF to a single newline.
            if c != '\r' {
                self.insert_char(c);
            }
        }
    }

    pub fn delete_before(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index(self.cursor);
        self.text.remove(idx);
    }

    pub fn delete_after(&mut self) {
        if self.cursor < self.char_len() {
            let idx = self.byte_index(self.cursor);
            self.text.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start();
    }

    pub fn move_end(&mut self) {
        let rest = self.text.chars().skip(self.cursor).take_while(|&c| c != '\n').count();
        self.cursor += rest;
    }

    /// (row, col) of the cursor, both in chars.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map_or(0, |line| line.chars().count());
        (row, col)
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn line_start(&self) -> usize {
        let (_, col) = self.cursor_row_col();
        self.cursor - col
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text.char_indices().nth(char_idx).map_or(self.text.len(), |(i, _)| i)
    }
}
