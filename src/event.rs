use crate::alert::ReceivedAlert;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Reconnecting { attempt: u32, delay_ms: u64 },
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Alert(ReceivedAlert),
    WsStatus(WsConnectionStatus),
    /// A frame that could not be decoded and was discarded.
    DecodeFailed(String),
    LogMessage(String),
    Error(String),
}
