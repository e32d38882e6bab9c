pub mod alert_list;
pub mod dashboard;
pub mod headless;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::alert::ReceivedAlert;
use crate::buffer::AlertBuffer;
use crate::event::{AppEvent, WsConnectionStatus};
use crate::input::{UiCommand, PAGE_SIZE};

use alert_list::AlertListPanel;
use dashboard::{KeybindBar, LogPanel, StatusBar};

const MAX_LOG_MESSAGES: usize = 200;

/// Everything the alert feed view draws. Only [`AppState::apply`] mutates the
/// alert buffer.
pub struct AppState {
    pub title: String,
    pub endpoint: String,
    pub alerts: AlertBuffer<ReceivedAlert>,
    pub status: WsConnectionStatus,
    pub received_count: u64,
    pub decode_failures: u64,
    pub reconnect_count: u64,
    pub log_messages: Vec<String>,
    /// Index of the alert shown at the top of the list, 0 is the newest.
    pub scroll: usize,
}

impl AppState {
    pub fn new(title: &str, endpoint: &str, max_alerts: usize) -> Self {
        Self {
            title: title.to_string(),
            endpoint: endpoint.to_string(),
            alerts: AlertBuffer::new(max_alerts),
            status: WsConnectionStatus::Disconnected,
            received_count: 0,
            decode_failures: 0,
            reconnect_count: 0,
            log_messages: Vec::new(),
            scroll: 0,
        }
    }

    pub fn ws_connected(&self) -> bool {
        self.status == WsConnectionStatus::Connected
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    fn max_scroll(&self) -> usize {
        self.alerts.len().saturating_sub(1)
    }

    pub fn handle_command(&mut self, cmd: UiCommand) {
        let max = self.max_scroll();
        self.scroll = match cmd {
            UiCommand::ScrollUp => self.scroll.saturating_sub(1),
            UiCommand::ScrollDown => (self.scroll + 1).min(max),
            UiCommand::PageUp => self.scroll.saturating_sub(PAGE_SIZE),
            UiCommand::PageDown => (self.scroll + PAGE_SIZE).min(max),
            UiCommand::ScrollTop => 0,
            UiCommand::ScrollBottom => max,
            UiCommand::Quit => self.scroll,
        };
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Alert(entry) => {
                self.received_count += 1;
                self.alerts.push(entry);
                // Keep the same alert under the cursor when scrolled away from the newest.
                if self.scroll > 0 {
                    self.scroll = (self.scroll + 1).min(self.max_scroll());
                }
            }
            AppEvent::WsStatus(status) => {
                match &status {
                    WsConnectionStatus::Connecting => {}
                    WsConnectionStatus::Connected => {
                        self.push_log("WebSocket Connected".to_string());
                    }
                    WsConnectionStatus::Disconnected => {
                        self.push_log("[WARN] WebSocket Disconnected".to_string());
                    }
                    WsConnectionStatus::Reconnecting { attempt, delay_ms } => {
                        self.reconnect_count += 1;
                        self.push_log(format!(
                            "[WARN] Reconnecting (attempt {}, wait {}ms)",
                            attempt, delay_ms
                        ));
                    }
                }
                self.status = status;
            }
            AppEvent::DecodeFailed(reason) => {
                self.decode_failures += 1;
                self.push_log(format!("[WARN] Discarded frame: {}", reason));
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(6),    // alert list
            Constraint::Length(7), // system log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            endpoint: &state.endpoint,
            status: &state.status,
            received_count: state.received_count,
            decode_failures: state.decode_failures,
            reconnect_count: state.reconnect_count,
        },
        outer[0],
    );

    frame.render_widget(
        AlertListPanel::new(&state.title, &state.alerts, state.scroll),
        outer[1],
    );

    frame.render_widget(LogPanel::new(&state.log_messages), outer[2]);

    frame.render_widget(KeybindBar, outer[3]);
}
