use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::event::WsConnectionStatus;

pub struct StatusBar<'a> {
    pub endpoint: &'a str,
    pub status: &'a WsConnectionStatus,
    pub received_count: u64,
    pub decode_failures: u64,
    pub reconnect_count: u64,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let conn_status = match self.status {
            WsConnectionStatus::Connected => {
                Span::styled("CONNECTED", Style::default().fg(Color::Green))
            }
            WsConnectionStatus::Connecting => {
                Span::styled("CONNECTING", Style::default().fg(Color::Yellow))
            }
            WsConnectionStatus::Reconnecting { attempt, delay_ms } => Span::styled(
                format!("RECONNECTING #{} in {}ms", attempt, delay_ms),
                Style::default().fg(Color::Yellow),
            ),
            WsConnectionStatus::Disconnected => Span::styled(
                "DISCONNECTED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };

        let line = Line::from(vec![
            Span::styled(
                " sniper-feed ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.endpoint, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            conn_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "alerts: {}  discarded: {}  reconnects: {}",
                    self.received_count, self.decode_failures, self.reconnect_count
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[↑/↓ j/k]", Style::default().fg(Color::Yellow)),
            Span::styled(" scroll  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[PgUp/PgDn]", Style::default().fg(Color::Yellow)),
            Span::styled(" page  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[g/G]", Style::default().fg(Color::Yellow)),
            Span::styled(" newest/oldest", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
