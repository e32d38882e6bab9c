use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::alert::ReceivedAlert;
use crate::buffer::AlertBuffer;

/// Rows taken by one alert: summary, contacts, separator.
pub const LINES_PER_ALERT: usize = 3;

/// Newest-first alert list, one summary row and one contacts row per alert.
pub struct AlertListPanel<'a> {
    title: &'a str,
    alerts: &'a AlertBuffer<ReceivedAlert>,
    scroll: usize,
}

impl<'a> AlertListPanel<'a> {
    pub fn new(title: &'a str, alerts: &'a AlertBuffer<ReceivedAlert>, scroll: usize) -> Self {
        Self {
            title,
            alerts,
            scroll,
        }
    }
}

fn alert_lines(entry: &ReceivedAlert) -> [Line<'static>; LINES_PER_ALERT] {
    let alert = &entry.alert;
    let received = entry.received_at.with_timezone(&Local).format("%H:%M:%S");
    [
        Line::from(vec![
            Span::styled(
                format!("{} ", received),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                alert.symbol().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - ", Style::default().fg(Color::DarkGray)),
            Span::styled(alert.safety_text(), Style::default().fg(Color::Yellow)),
            Span::styled(" - ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}$", alert.liquidity_text()),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(Span::styled(
            format!("  {}", alert.contacts_line()),
            Style::default().fg(Color::Cyan),
        )),
        Line::default(),
    ]
}

impl Widget for AlertListPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(
                " {} ({}/{}) ",
                self.title,
                self.alerts.len(),
                self.alerts.capacity()
            ))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        if self.alerts.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Waiting for alerts...",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block)
            .render(area, buf);
            return;
        }

        let lines: Vec<Line> = self.alerts.iter().flat_map(alert_lines).collect();
        let offset = (self.scroll * LINES_PER_ALERT).min(u16::MAX as usize) as u16;

        Paragraph::new(lines)
            .block(block)
            .scroll((offset, 0))
            .render(area, buf);
    }
}
