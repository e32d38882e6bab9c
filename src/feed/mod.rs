pub mod backoff;

use anyhow::{Context, Result};
use futures_util::{SinkExt, Stream, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use url::Url;

use crate::alert::{Alert, ReceivedAlert};
use crate::config::ReconnectConfig;
use crate::error::AppError;
use crate::event::{AppEvent, WsConnectionStatus};
use backoff::{RetryDecision, RetryPolicy};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// How a single connection ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Shutdown was requested.
    Shutdown,
    /// The event receiver is gone, nobody is watching the feed anymore.
    ViewClosed,
}

/// Receive-only client for the alert stream.
pub struct FeedClient {
    url: Url,
    reconnect: ReconnectConfig,
}

impl FeedClient {
    pub fn new(url: Url, reconnect: ReconnectConfig) -> Self {
        Self { url, reconnect }
    }

    /// Start the connection task. The returned handle owns the connection:
    /// closing or dropping it tears the socket down.
    pub fn spawn(self, event_tx: mpsc::Sender<AppEvent>) -> FeedHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            if let Err(e) = self.connect_and_run(event_tx, shutdown_rx).await {
                tracing::error!(error = %e, "Feed task failed");
            }
        });
        FeedHandle {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Connect and run the read loop, reconnecting per the retry policy.
    /// Returns once shutdown is requested, the receiver is dropped, or the
    /// policy stops retrying.
    pub async fn connect_and_run(
        &self,
        event_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut policy = self.reconnect.retry_policy();

        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.connect_once(&event_tx, &mut shutdown, &mut policy).await {
                Ok(end) => {
                    tracing::info!(?end, url = %self.url, "Feed connection closed");
                    let _ = emit(
                        &event_tx,
                        &mut shutdown,
                        AppEvent::WsStatus(WsConnectionStatus::Disconnected),
                    )
                    .await;
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %format!("{:#}", e),
                        url = %self.url,
                        failures = policy.consecutive_failures(),
                        "Feed connection failed"
                    );
                    let notices = [
                        AppEvent::WsStatus(WsConnectionStatus::Disconnected),
                        AppEvent::LogMessage(format!("WS error: {:#}", e)),
                    ];
                    if emit_all(&event_tx, &mut shutdown, notices).await.is_err() {
                        break;
                    }

                    let (attempt, delay) = match policy.on_failure() {
                        RetryDecision::Retry { attempt, delay } => (attempt, delay),
                        RetryDecision::Stop => {
                            let _ = emit(
                                &event_tx,
                                &mut shutdown,
                                AppEvent::Error("Connection lost, reconnect is disabled".to_string()),
                            )
                            .await;
                            break;
                        }
                        RetryDecision::GiveUp { attempts } => {
                            tracing::error!(attempts, url = %self.url, "Giving up on feed");
                            let _ = emit(
                                &event_tx,
                                &mut shutdown,
                                AppEvent::Error(format!(
                                    "Connection lost, gave up after {} attempts",
                                    attempts
                                )),
                            )
                            .await;
                            break;
                        }
                    };

                    let reconnecting = WsConnectionStatus::Reconnecting {
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                    };
                    if emit(&event_tx, &mut shutdown, AppEvent::WsStatus(reconnecting))
                        .await
                        .is_err()
                    {
                        break;
                    }

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue,
                        _ = shutdown_requested(&mut shutdown) => {
                            tracing::info!("Shutdown during reconnect");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn connect_once(
        &self,
        event_tx: &mpsc::Sender<AppEvent>,
        shutdown: &mut watch::Receiver<bool>,
        policy: &mut RetryPolicy,
    ) -> Result<SessionEnd> {
        let connecting = [
            AppEvent::WsStatus(WsConnectionStatus::Connecting),
            AppEvent::LogMessage(format!("Connecting to {}", self.url)),
        ];
        if let Err(end) = emit_all(event_tx, shutdown, connecting).await {
            return Ok(end);
        }

        let connect = tokio_tungstenite::connect_async(self.url.as_str());
        let (ws_stream, _resp) = tokio::select! {
            res = connect => res.context("WebSocket connect failed")?,
            _ = shutdown_requested(shutdown) => return Ok(SessionEnd::Shutdown),
        };

        policy.on_connected();
        tracing::info!(url = %self.url, "Feed connected");

        let (mut write, mut read) = ws_stream.split();
        let end = match emit(
            event_tx,
            shutdown,
            AppEvent::WsStatus(WsConnectionStatus::Connected),
        )
        .await
        {
            Ok(()) => read_frames(&mut read, event_tx, shutdown).await?,
            Err(end) => end,
        };

        if let Err(e) = write.close().await {
            tracing::debug!(error = %e, "Error while closing feed socket");
        }
        Ok(end)
    }
}

/// Forward text frames until shutdown, the view goes away, or the
/// connection drops. Only a dropped connection is an error.
async fn read_frames<S>(
    read: &mut S,
    event_tx: &mpsc::Sender<AppEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<SessionEnd>
where
    S: Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            msg = read.next() => msg,
            _ = shutdown_requested(shutdown) => return Ok(SessionEnd::Shutdown),
        };
        match msg {
            Some(Ok(tungstenite::Message::Text(text))) => {
                if let Err(end) = emit(event_tx, shutdown, frame_event(&text)).await {
                    return Ok(end);
                }
            }
            Some(Ok(tungstenite::Message::Close(frame))) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "no reason".to_string());
                return Err(AppError::WebSocket(format!(
                    "server closed connection ({})",
                    reason
                ))
                .into());
            }
            Some(Ok(tungstenite::Message::Binary(bytes))) => {
                tracing::debug!(len = bytes.len(), "Ignoring binary frame");
            }
            Some(Ok(_)) => {
                // ping/pong are answered by tungstenite
            }
            Some(Err(e)) => {
                return Err(AppError::WebSocket(format!("read error: {}", e)).into());
            }
            None => {
                return Err(AppError::WebSocket("stream ended".to_string()).into());
            }
        }
    }
}

/// Turn one inbound text frame into the event the view applies: an alert,
/// or a discard notice when the frame cannot be decoded.
pub fn frame_event(text: &str) -> AppEvent {
    match Alert::decode(text) {
        Ok(alert) => {
            tracing::debug!(symbol = alert.symbol(), "Alert received");
            AppEvent::Alert(ReceivedAlert::new(alert))
        }
        Err(e) => {
            tracing::warn!(error = %e, len = text.len(), "Discarding undecodable frame");
            AppEvent::DecodeFailed(e.to_string())
        }
    }
}

/// Deliver one event to the view. A full channel waits for room, but never
/// past a shutdown request.
async fn emit(
    event_tx: &mpsc::Sender<AppEvent>,
    shutdown: &mut watch::Receiver<bool>,
    evt: AppEvent,
) -> std::result::Result<(), SessionEnd> {
    tokio::select! {
        biased;
        res = event_tx.send(evt) => res.map_err(|_| SessionEnd::ViewClosed),
        _ = shutdown_requested(shutdown) => Err(SessionEnd::Shutdown),
    }
}

async fn emit_all(
    event_tx: &mpsc::Sender<AppEvent>,
    shutdown: &mut watch::Receiver<bool>,
    events: impl IntoIterator<Item = AppEvent>,
) -> std::result::Result<(), SessionEnd> {
    for evt in events {
        emit(event_tx, shutdown, evt).await?;
    }
    Ok(())
}

/// Resolves once shutdown is requested or the handle is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Owns the running connection task.
///
/// [`FeedHandle::close`] sends a close frame and waits for the task.
/// Dropping the handle without closing signals shutdown and aborts the task,
/// which drops the socket.
pub struct FeedHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub async fn close(mut self) {
        let _ = self.shutdown_tx.send(true);
        let Some(mut task) = self.task.take() else {
            return;
        };
        match tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await {
            Ok(Ok(())) => tracing::info!("Feed closed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Feed task ended abnormally"),
            Err(_) => {
                tracing::warn!("Feed did not close in time, aborting");
                task.abort();
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
