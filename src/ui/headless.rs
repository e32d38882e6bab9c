use chrono::Local;

use crate::alert::ReceivedAlert;
use crate::event::{AppEvent, WsConnectionStatus};

/// Indent that lines the contacts row up under the summary.
const CONTACTS_INDENT: &str = "         ";

/// Plain-text rendering of one alert for `--headless`: the receive time and
/// summary on the first line, contacts on the second.
pub fn alert_report(entry: &ReceivedAlert) -> String {
    let received = entry.received_at.with_timezone(&Local).format("%H:%M:%S");
    format!(
        "{} {}\n{}{}",
        received,
        entry.alert.summary_line(),
        CONTACTS_INDENT,
        entry.alert.contacts_line()
    )
}

/// Diagnostic line for stderr. Alerts go to stdout through [`alert_report`].
pub fn event_notice(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::Alert(_) => None,
        AppEvent::WsStatus(status) => Some(format!("status: {}", status_label(status))),
        AppEvent::DecodeFailed(reason) => Some(format!("discarded frame: {}", reason)),
        AppEvent::LogMessage(msg) => Some(msg.clone()),
        AppEvent::Error(msg) => Some(format!("error: {}", msg)),
    }
}

fn status_label(status: &WsConnectionStatus) -> String {
    match status {
        WsConnectionStatus::Connecting => "connecting".to_string(),
        WsConnectionStatus::Connected => "connected".to_string(),
        WsConnectionStatus::Disconnected => "disconnected".to_string(),
        WsConnectionStatus::Reconnecting { attempt, delay_ms } => {
            format!("reconnecting (attempt {}, wait {}ms)", attempt, delay_ms)
        }
    }
}
