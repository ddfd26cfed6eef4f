// Generation lifecycle: submit, stream, finish/stop/fail, regenerate.

use localchat::Cli;
use localchat::app::{NoticeKind, regenerate_last_response, stop_generation};
use localchat::conversation::{MessageId, Role};
use localchat::engine::{EngineCommand, EngineEvent, EngineStatus};
use localchat::viewport::row_options;
use pretty_assertions::assert_eq;
use std::time::Duration;

use crate::helpers::{
    generating_message, last_content, ready_app, send_engine_event, submit, test_app, token,
};

fn last_row_options(app: &localchat::app::App) -> localchat::viewport::RowOptions {
    let last = app.store.active().and_then(|c| c.last_message()).unwrap();
    row_options(last.role, true, app.gate())
}

#[tokio::test]
async fn tokens_stream_into_trailing_assistant_message() {
    let (mut app, mut rx) = ready_app();
    submit(&mut app, "hello");
    assert!(matches!(rx.try_recv().unwrap(), EngineCommand::Generate(_)));

    token(&mut app, "Hi ");
    token(&mut app, "there");
    assert_eq!(last_content(&app), "Hi there");
    assert!(app.is_generating());
    let options = last_row_options(&app);
    assert!(options.show_stop);
    assert!(!options.show_regenerate);

    let message_id = generating_message(&app);
    send_engine_event(&mut app, EngineEvent::GenerationFinished { message_id });
    assert!(!app.is_generating());
    let options = last_row_options(&app);
    assert!(!options.show_stop);
    assert!(options.show_regenerate);
}

#[tokio::test]
async fn stop_keeps_generating_until_engine_confirms() {
    let (mut app, mut rx) = ready_app();
    submit(&mut app, "hello");
    let _ = rx.try_recv();
    token(&mut app, "partial");

    assert!(stop_generation(&mut app));
    assert!(matches!(rx.try_recv().unwrap(), EngineCommand::Stop));
    assert!(app.is_generating(), "stop is fire-and-forget");

    let message_id = generating_message(&app);
    send_engine_event(&mut app, EngineEvent::GenerationStopped { message_id });
    assert!(!app.is_generating());
    assert_eq!(last_content(&app), "partial");
}

#[tokio::test]
async fn failure_clears_generation_and_reports() {
    let (mut app, _rx) = ready_app();
    submit(&mut app, "hello");
    let message_id = generating_message(&app);

    send_engine_event(
        &mut app,
        EngineEvent::GenerationFailed { message_id: Some(message_id), error: "boom".to_owned() },
    );
    assert!(!app.is_generating());
    let notice = app.notice.as_ref().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.text.contains("boom"));
}

#[tokio::test]
async fn completion_for_unknown_message_is_ignored() {
    let (mut app, _rx) = ready_app();
    submit(&mut app, "hello");
    send_engine_event(
        &mut app,
        EngineEvent::GenerationFinished { message_id: MessageId::from("someone-else") },
    );
    assert!(app.is_generating());
}

#[tokio::test]
async fn regenerate_drops_stale_tokens_of_replaced_reply() {
    let (mut app, mut rx) = ready_app();
    submit(&mut app, "hello");
    let conversation_id = app.store.active_id().cloned().unwrap();
    let first = generating_message(&app);
    token(&mut app, "first answer");
    send_engine_event(&mut app, EngineEvent::GenerationFinished { message_id: first.clone() });
    while rx.try_recv().is_ok() {}

    assert!(regenerate_last_response(&mut app));
    assert!(matches!(rx.try_recv().unwrap(), EngineCommand::Generate(_)));
    assert_eq!(last_content(&app), "");

    // A late token for the replaced reply must not leak into the new one.
    send_engine_event(
        &mut app,
        EngineEvent::Token { conversation_id, message_id: first, text: "late".to_owned() },
    );
    assert_eq!(last_content(&app), "");
    let conversation = app.store.active().unwrap();
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn loading_toggle_revokes_regenerate_until_ready_again() {
    let (mut app, _rx) = ready_app();
    submit(&mut app, "hello");
    let message_id = generating_message(&app);
    send_engine_event(&mut app, EngineEvent::GenerationFinished { message_id });
    assert!(last_row_options(&app).show_regenerate);

    send_engine_event(&mut app, EngineEvent::LoadingChanged(true));
    assert!(!last_row_options(&app).show_regenerate);
    assert!(!regenerate_last_response(&mut app));

    send_engine_event(&mut app, EngineEvent::LoadingChanged(false));
    assert!(last_row_options(&app).show_regenerate);
}

#[tokio::test]
async fn submit_is_refused_before_model_loads() {
    let (mut app, mut rx) = test_app();
    submit(&mut app, "too early");
    assert!(rx.try_recv().is_err());
    assert_eq!(app.input.text(), "too early");
}

/// Drain engine events into the app until `done` holds or the deadline passes.
async fn pump_until(app: &mut localchat::app::App, done: impl Fn(&localchat::app::App) -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !done(app) {
        let event = tokio::time::timeout_at(deadline, app.event_rx.recv())
            .await
            .expect("engine went quiet")
            .expect("engine channel closed");
        localchat::app::handle_engine_event(app, event);
    }
}

#[tokio::test]
async fn scripted_engine_round_trip() {
    let cli = <Cli as clap::Parser>::try_parse_from([
        "localchat",
        "--token-delay-ms",
        "1",
        "--load-delay-ms",
        "1",
    ])
    .unwrap();
    let mut app = localchat::app::create_app(&cli).unwrap();
    pump_until(&mut app, |app| app.gate().is_model_ready).await;
    assert_eq!(app.engine_status, EngineStatus::Ready);

    submit(&mut app, "ping");
    assert!(app.is_generating());
    pump_until(&mut app, |app| !app.is_generating()).await;

    let reply = last_content(&app);
    assert!(reply.contains("> ping"), "unexpected reply: {reply}");
    assert!(last_row_options(&app).show_regenerate);
}
