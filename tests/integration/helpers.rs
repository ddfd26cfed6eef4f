use localchat::app::App;
use localchat::conversation::MessageId;
use localchat::engine::{EngineCommand, EngineEvent, EngineStatus};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use tokio::sync::mpsc::UnboundedReceiver;

/// Build a minimal `App` for integration testing.
/// No engine task, no TUI -- just state plus the command channel.
pub fn test_app() -> (App, UnboundedReceiver<EngineCommand>) {
    App::test_default()
}

/// Like [`test_app`] with the model already loaded.
pub fn ready_app() -> (App, UnboundedReceiver<EngineCommand>) {
    let (mut app, rx) = test_app();
    send_engine_event(&mut app, EngineEvent::StatusChanged(EngineStatus::Ready));
    (app, rx)
}

pub fn send_engine_event(app: &mut App, event: EngineEvent) {
    localchat::app::handle_engine_event(app, event);
}

/// Type `text` and press send.
pub fn submit(app: &mut App, text: &str) {
    app.input.insert_str(text);
    localchat::app::submit_input(app);
}

pub fn generating_message(app: &App) -> MessageId {
    app.generation.as_ref().map(|g| g.message_id.clone()).unwrap()
}

/// Feed one streamed token into the active generation.
pub fn token(app: &mut App, text: &str) {
    let generation = app.generation.clone().unwrap();
    send_engine_event(
        app,
        EngineEvent::Token {
            conversation_id: generation.conversation_id,
            message_id: generation.message_id,
            text: text.to_owned(),
        },
    );
}

pub fn last_content(app: &App) -> String {
    app.store.active().and_then(|c| c.last_message()).map(|m| m.content.clone()).unwrap_or_default()
}

pub fn terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).unwrap()
}

/// Run one update cycle (viewport sync + render) and return the screen text.
pub fn draw(app: &mut App, terminal: &mut Terminal<TestBackend>) -> String {
    app.sync_viewport();
    terminal.draw(|f| localchat::ui::render(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buffer[(x, y)].symbol().to_owned())
                .collect::<String>()
                .trim_end()
                .to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
