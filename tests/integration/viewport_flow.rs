// Viewport behaviour through full update cycles: sync, render, input.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use localchat::app::{App, handle_terminal_event};
use localchat::conversation::{Message, Role};
use localchat::engine::EngineEvent;
use localchat::ui::theme::ThemeMode;
use pretty_assertions::assert_eq;

use crate::helpers::{
    draw, generating_message, ready_app, send_engine_event, submit, terminal, token,
};

fn seed_history(app: &mut App, count: usize) {
    let id = app.store.ensure_active();
    for i in 0..count {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        app.store.push_message(&id, Message::new(role, format!("message number {i}")));
    }
}

fn click(app: &mut App, column: u16, row: u16) {
    handle_terminal_event(
        app,
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }),
    );
}

fn key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    handle_terminal_event(app, Event::Key(KeyEvent::new(code, modifiers)));
}

#[tokio::test]
async fn streaming_at_bottom_stays_pinned() {
    let (mut app, _rx) = ready_app();
    seed_history(&mut app, 10);
    submit(&mut app, "go");
    let mut term = terminal(60, 16);
    draw(&mut app, &mut term);

    for i in 0..8 {
        token(&mut app, &format!("marker-{i}\n\n"));
        let screen = draw(&mut app, &mut term);
        assert!(app.viewport.is_at_bottom());
        assert!(screen.contains(&format!("marker-{i}")), "marker-{i} not visible:\n{screen}");
        assert!(!screen.contains("Jump to latest"));
    }
}

#[tokio::test]
async fn scrolled_up_reader_is_not_yanked_by_new_tokens() {
    let (mut app, _rx) = ready_app();
    seed_history(&mut app, 10);
    submit(&mut app, "go");
    let mut term = terminal(60, 16);
    draw(&mut app, &mut term);

    app.viewport.scroll_up(5);
    draw(&mut app, &mut term);
    let offset = app.viewport.scroll().offset();
    assert!(!app.viewport.is_at_bottom());

    token(&mut app, &"x".repeat(50));
    let screen = draw(&mut app, &mut term);
    assert_eq!(app.viewport.scroll().offset(), offset);
    assert!(!app.viewport.is_at_bottom());
    assert!(screen.contains("Jump to latest"));

    let button = app.scroll_button_area.unwrap();
    click(&mut app, button.x, button.y);
    let screen = draw(&mut app, &mut term);
    assert!(app.viewport.is_at_bottom());
    assert!(screen.contains(&"x".repeat(50)));
    assert!(app.scroll_button_area.is_none());
}

#[tokio::test]
async fn generation_end_does_not_move_scrolled_reader() {
    let (mut app, _rx) = ready_app();
    seed_history(&mut app, 10);
    submit(&mut app, "go");
    token(&mut app, "answer");
    let mut term = terminal(60, 16);
    draw(&mut app, &mut term);

    app.viewport.page_up();
    draw(&mut app, &mut term);
    let offset = app.viewport.scroll().offset();

    let message_id = generating_message(&app);
    send_engine_event(&mut app, EngineEvent::GenerationFinished { message_id });
    draw(&mut app, &mut term);
    assert_eq!(app.viewport.scroll().offset(), offset);
    assert!(!app.viewport.is_at_bottom());
}

#[tokio::test]
async fn switching_conversation_resets_to_bottom() {
    let (mut app, _rx) = ready_app();
    seed_history(&mut app, 12);
    let mut term = terminal(60, 16);
    draw(&mut app, &mut term);
    app.viewport.scroll_to_top();
    draw(&mut app, &mut term);
    assert!(!app.viewport.is_at_bottom());

    key(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
    let screen = draw(&mut app, &mut term);
    assert!(app.viewport.is_at_bottom());
    assert!(screen.contains("press Enter to start"));
    assert!(!screen.contains("Jump to latest"));

    key(&mut app, KeyCode::Left, KeyModifiers::ALT);
    let screen = draw(&mut app, &mut term);
    assert!(app.viewport.is_at_bottom());
    assert!(screen.contains("message number 11"));
}

#[tokio::test]
async fn regenerate_hint_follows_model_readiness() {
    let (mut app, _rx) = ready_app();
    seed_history(&mut app, 4);
    let mut term = terminal(60, 20);
    assert!(draw(&mut app, &mut term).contains("Ctrl+R to regenerate"));

    send_engine_event(&mut app, EngineEvent::LoadingChanged(true));
    let screen = draw(&mut app, &mut term);
    assert!(!screen.contains("Ctrl+R to regenerate"));
    assert!(!screen.contains("Esc to stop"));

    send_engine_event(&mut app, EngineEvent::LoadingChanged(false));
    assert!(draw(&mut app, &mut term).contains("Ctrl+R to regenerate"));
}

#[tokio::test]
async fn empty_conversation_shows_placeholder_without_controls() {
    let (mut app, _rx) = ready_app();
    app.store.create();
    let mut term = terminal(60, 16);
    let screen = draw(&mut app, &mut term);
    assert!(screen.contains("New chat"));
    assert!(!screen.contains("Jump to latest"));
    assert!(!screen.contains("Ctrl+R to regenerate"));
    assert!(app.scroll_button_area.is_none());
}

#[tokio::test]
async fn header_actions_are_clickable() {
    let (mut app, _rx) = ready_app();
    app.store.create();
    let mut term = terminal(120, 16);
    draw(&mut app, &mut term);

    let (_, theme_button) = app.header_action_areas.first().copied().unwrap();
    click(&mut app, theme_button.x, theme_button.y);
    assert_eq!(app.theme, ThemeMode::Light);
    assert!(app.line_cache.is_empty());
}

#[tokio::test]
async fn finished_chat_never_shows_stop_while_another_streams() {
    let (mut app, mut rx) = ready_app();
    let first = app.store.ensure_active();
    app.store.push_message(&first, Message::new(Role::User, "old question"));
    app.store.push_message(&first, Message::new(Role::Assistant, "old finished answer"));

    key(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
    submit(&mut app, "go");
    token(&mut app, "streaming");
    let streaming = app.store.active_id().cloned();
    let mut term = terminal(60, 16);
    assert!(draw(&mut app, &mut term).contains("Esc to stop"));
    while rx.try_recv().is_ok() {}

    key(&mut app, KeyCode::Left, KeyModifiers::ALT);
    assert_eq!(app.store.active_id().cloned(), streaming);
    let screen = draw(&mut app, &mut term);
    assert!(!screen.contains("old finished answer"));

    let message_id = generating_message(&app);
    send_engine_event(&mut app, EngineEvent::GenerationFinished { message_id });
    key(&mut app, KeyCode::Left, KeyModifiers::ALT);
    assert_eq!(app.store.active_id(), Some(&first));
    let screen = draw(&mut app, &mut term);
    assert!(screen.contains("old finished answer"));
    assert!(!screen.contains("Esc to stop"));

    key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
    assert!(rx.try_recv().is_err(), "Esc in a finished chat must not reach the engine");
}
