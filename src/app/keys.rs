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

use super::{App, HeaderAction, Overlay, actions};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const LINE_SCROLL: usize = 1;

fn is_ctrl(modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::CONTROL) && !modifiers.contains(KeyModifiers::ALT)
}

pub(super) fn handle_key(app: &mut App, key: KeyEvent) {
    if handle_global_key(app, key) {
        return;
    }
    if app.overlay != Overlay::None {
        // Any other key dismisses the overlay.
        app.overlay = Overlay::None;
        return;
    }
    handle_normal_key(app, key);
}

fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c' | 'q'), m) if is_ctrl(m) => {
            app.should_quit = true;
            true
        }
        (KeyCode::Char('l'), m) if is_ctrl(m) => {
            app.force_redraw = true;
            true
        }
        _ => false,
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            actions::stop_generation(app);
        }
        (KeyCode::Enter, m) if m.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            app.input.insert_char('\n');
        }
        (KeyCode::Enter, _) => actions::submit_input(app),

        // Generation
        (KeyCode::Char('r'), m) if is_ctrl(m) => {
            actions::regenerate_last_response(app);
        }
        (KeyCode::F(5), _) => actions::reload_model(app),

        // Conversations
        (KeyCode::Char('n'), m) if is_ctrl(m) => {
            actions::new_conversation(app);
        }
        (KeyCode::Left, m) if m.contains(KeyModifiers::ALT) => {
            actions::cycle_conversation(app, false);
        }
        (KeyCode::Right, m) if m.contains(KeyModifiers::ALT) => {
            actions::cycle_conversation(app, true);
        }

        // Header actions
        (KeyCode::Char('t'), m) if is_ctrl(m) => {
            actions::run_header_action(app, HeaderAction::ToggleTheme);
        }
        (KeyCode::Char('e'), m) if is_ctrl(m) => {
            actions::run_header_action(app, HeaderAction::Export);
        }
        (KeyCode::Char('o'), m) if is_ctrl(m) => {
            actions::run_header_action(app, HeaderAction::Import);
        }
        (KeyCode::Char('s'), m) if is_ctrl(m) => {
            actions::run_header_action(app, HeaderAction::Share);
        }
        (KeyCode::Char('p'), m) if is_ctrl(m) => {
            actions::run_header_action(app, HeaderAction::TogglePin);
        }
        (KeyCode::F(2), _) => actions::run_header_action(app, HeaderAction::Settings),
        (KeyCode::F(1), _) => actions::run_header_action(app, HeaderAction::Shortcuts),
        (KeyCode::Char('?'), _) if app.input.text().is_empty() => {
            actions::run_header_action(app, HeaderAction::Shortcuts);
        }

        // Viewport scrolling
        (KeyCode::PageUp, _) => app.viewport.page_up(),
        (KeyCode::PageDown, _) => app.viewport.page_down(),
        (KeyCode::Up, m) if is_ctrl(m) => app.viewport.scroll_up(LINE_SCROLL),
        (KeyCode::Down, m) if is_ctrl(m) => app.viewport.scroll_down(LINE_SCROLL),
        (KeyCode::Home, m) if is_ctrl(m) => app.viewport.scroll_to_top(),
        (KeyCode::End, m) if is_ctrl(m) => app.viewport.scroll_to_bottom(),

        // Input editing
        (KeyCode::Backspace, _) => app.input.delete_before(),
        (KeyCode::Delete, _) => app.input.delete_after(),
        (KeyCode::Left, _) => app.input.move_left(),
        (KeyCode::Right, _) => app.input.move_right(),
        (KeyCode::Home, _) => app.input.move_home(),
        (KeyCode::End, _) => app.input.move_end(),
        (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.input.insert_char(c);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineStatus;
    use pretty_assertions::assert_eq;

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key(app, KeyEvent::new(code, modifiers));
    }

    #[test]
    fn typing_then_enter_submits() {
        let (mut app, _rx) = App::test_default();
        app.engine_status = EngineStatus::Ready;
        for c in "hi".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.store.active().unwrap().messages.len(), 2);
        assert!(app.input.is_blank());
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let (mut app, _rx) = App::test_default();
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::SHIFT);
        press(&mut app, KeyCode::Char('b'), KeyModifiers::SHIFT);
        assert_eq!(app.input.text(), "a\nb");
    }

    #[test]
    fn question_mark_opens_shortcuts_only_on_empty_input() {
        let (mut app, _rx) = App::test_default();
        press(&mut app, KeyCode::Char('?'), KeyModifiers::NONE);
        assert_eq!(app.overlay, Overlay::Shortcuts);
        press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.input.text(), "");

        press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('?'), KeyModifiers::NONE);
        assert_eq!(app.input.text(), "x?");
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut app, _rx) = App::test_default();
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_n_and_alt_arrows_switch_conversations() {
        let (mut app, _rx) = App::test_default();
        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        let first = app.store.active_id().cloned();
        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_ne!(app.store.active_id().cloned(), first);
        press(&mut app, KeyCode::Left, KeyModifiers::ALT);
        assert_eq!(app.store.active_id().cloned(), first);
    }
}
