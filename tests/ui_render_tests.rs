use ratatui::backend::TestBackend;
use ratatui::Terminal;

use sniper_feed::event::{AppEvent, WsConnectionStatus};
use sniper_feed::feed::frame_event;
use sniper_feed::ui::{self, AppState};

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn draw(state: &AppState) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| ui::render(frame, state))
        .expect("render should succeed");
    buffer_text(&terminal)
}

fn state() -> AppState {
    AppState::new("ETH Degen Sniper Alerts", "ws://localhost:8000/api/ws", 50)
}

#[test]
/// Before any frame arrives the list is empty and nothing is flagged as an error.
fn render_empty_stream() {
    let text = draw(&state());
    assert!(text.contains("ETH Degen Sniper Alerts (0/50)"));
    assert!(text.contains("Waiting for alerts..."));
    assert!(!text.contains("[ERR]"));
    assert!(!text.contains("???"));
}

#[test]
fn render_lists_alerts_newest_first() {
    let mut s = state();
    for symbol in ["ALPHA", "BRAVO", "CHARLIE"] {
        s.apply(frame_event(&format!(
            r#"{{"pair": {{"baseToken": {{"symbol": "{}"}}}}}}"#,
            symbol
        )));
    }
    let text = draw(&s);
    let charlie = text.find("CHARLIE").expect("CHARLIE rendered");
    let bravo = text.find("BRAVO").expect("BRAVO rendered");
    let alpha = text.find("ALPHA").expect("ALPHA rendered");
    assert!(charlie < bravo && bravo < alpha);
    assert!(text.contains("(3/50)"));
}

#[test]
fn render_alert_fields_and_fallbacks() {
    let mut s = state();
    s.apply(frame_event(
        r#"{"safety": "UNKNOWN", "twitter": "https://x.com/a", "telegram": "No TG", "web": "No website"}"#,
    ));
    s.apply(frame_event(
        r#"{"pair": {"baseToken": {"symbol": "PEPE"}, "liquidity": {"usd": 15234.5}}, "safety": "SAFE"}"#,
    ));
    let text = draw(&s);
    assert!(text.contains("PEPE - SAFE - 15234.5$"));
    assert!(text.contains("??? - UNKNOWN - 0$"));
    assert!(text.contains("https://x.com/a"));
    assert!(text.contains("No website"));
}

#[test]
fn render_connection_indicator() {
    let mut s = state();
    assert!(draw(&s).contains("DISCONNECTED"));

    s.apply(AppEvent::WsStatus(WsConnectionStatus::Connected));
    let text = draw(&s);
    assert!(text.contains("CONNECTED"));
    assert!(!text.contains("DISCONNECTED"));

    s.apply(AppEvent::WsStatus(WsConnectionStatus::Reconnecting {
        attempt: 3,
        delay_ms: 4_000,
    }));
    assert!(draw(&s).contains("RECONNECTING #3 in 4000ms"));
}

#[test]
fn render_counts_discarded_frames() {
    let mut s = state();
    s.apply(frame_event("garbage"));
    let text = draw(&s);
    assert!(text.contains("discarded: 1"));
    assert!(text.contains("Discarded frame"));
}
