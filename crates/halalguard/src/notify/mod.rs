//! Push notifications from the analysis service.
//!
//! A background task holds a websocket open against the service and parses
//! each text frame into a [`Notification`]. The newest notification replaces
//! whatever is showing and expires on its own five seconds after arrival.
//! Connection loss triggers reconnects with doubling backoff, capped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Severity of a pushed notification, mirroring the wire `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Status,
    Success,
    Error,
}

/// One pushed message. Wire shape: `{"type": "success", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub content: String,
}

/// How long a notification stays visible before it self-dismisses.
pub const DISMISS_AFTER: Duration = Duration::from_secs(5);

struct ActiveNotice {
    notification: Notification,
    expires_at: Instant,
}

/// Holds at most one visible notification.
///
/// Expiry is lazy: the deadline is checked when the board is read, so no
/// timer task is needed and a newer publish cannot race a stale dismissal.
#[derive(Default)]
pub struct NoticeBoard {
    current: Mutex<Option<ActiveNotice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notification, replacing any that is already visible. The
    /// five-second clock restarts from now.
    pub fn publish(&self, notification: Notification) {
        let mut slot = self.current.lock().expect("notice board lock poisoned");
        *slot = Some(ActiveNotice {
            notification,
            expires_at: Instant::now() + DISMISS_AFTER,
        });
    }

    /// The visible notification, if any and not yet expired.
    pub fn current(&self) -> Option<Notification> {
        let mut slot = self.current.lock().expect("notice board lock poisoned");
        match &*slot {
            Some(active) if Instant::now() < active.expires_at => {
                Some(active.notification.clone())
            }
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Manual dismissal, ahead of the deadline.
    pub fn dismiss(&self) {
        let mut slot = self.current.lock().expect("notice board lock poisoned");
        *slot = None;
    }
}

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// A connection must survive this long before the reconnect delay resets,
/// so an endpoint that accepts and immediately drops still backs off.
const STABLE_AFTER: Duration = Duration::from_secs(30);

/// Doubling reconnect delay, capped at [`MAX_BACKOFF`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Backoff {
    delay: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            delay: INITIAL_BACKOFF,
        }
    }

    /// Delay to wait before the next attempt; doubles for the one after.
    fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(MAX_BACKOFF);
        current
    }

    /// Reset accumulated delay once a connection has proven stable.
    fn note_connection_lived(&mut self, lived: Duration) {
        if lived >= STABLE_AFTER {
            self.delay = INITIAL_BACKOFF;
        }
    }
}

/// Handle to the running listener. Stop is idempotent.
pub struct ChannelHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}

pub struct NotificationChannel;

impl NotificationChannel {
    /// Connect to `url` and feed incoming frames onto `board` until stopped.
    pub fn spawn(url: impl Into<String>, board: Arc<NoticeBoard>) -> ChannelHandle {
        let url = url.into();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(listen_loop(url, board, stop_rx));
        ChannelHandle { stop_tx, task }
    }
}

async fn listen_loop(url: String, board: Arc<NoticeBoard>, mut stop_rx: watch::Receiver<bool>) {
    let mut backoff = Backoff::new();

    loop {
        if *stop_rx.borrow() {
            break;
        }

        let stream = tokio::select! {
            connected = connect_async(url.as_str()) => connected,
            _ = stop_rx.changed() => continue,
        };

        let (stream, _) = match stream {
            Ok(pair) => pair,
            Err(err) => {
                let delay = backoff.next_delay();
                warn!(url = %url, error = %err, "notification socket connect failed, retrying in {:?}", delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = stop_rx.changed() => {}
                }
                continue;
            }
        };

        info!(url = %url, "notification socket connected");
        let connected_at = tokio::time::Instant::now();
        let (_, mut read) = stream.split();

        loop {
            tokio::select! {
                _ = stop_rx.changed() => {
                    if *stop_rx.borrow() {
                        return;
                    }
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => handle_frame(&text, &board),
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("notification socket closed by peer");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(error = %err, "notification socket read failed");
                            break;
                        }
                    }
                }
            }
        }

        // A disconnect waits out the backoff as well; a flapping endpoint
        // that accepts and drops must not be reconnected at full speed.
        backoff.note_connection_lived(connected_at.elapsed());
        let delay = backoff.next_delay();
        debug!("notification socket disconnected, reconnecting in {:?}", delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop_rx.changed() => {}
        }
    }
}

/// Parse one text frame and publish it. A malformed frame is logged and
/// dropped without touching the visible notification.
pub(crate) fn handle_frame(text: &str, board: &NoticeBoard) {
    match serde_json::from_str::<Notification>(text) {
        Ok(notification) => {
            debug!(kind = ?notification.kind, "notification received");
            board.publish(notification);
        }
        Err(err) => {
            warn!(error = %err, "dropping malformed notification frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(kind: NotificationKind, content: &str) -> Notification {
        Notification {
            kind,
            content: content.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn notification_expires_after_five_seconds() {
        let board = NoticeBoard::new();
        board.publish(notice(NotificationKind::Success, "Analisis selesai"));
        assert!(board.current().is_some());

        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert!(board.current().is_some());

        tokio::time::advance(Duration::from_millis(2)).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_notification_replaces_and_restarts_clock() {
        let board = NoticeBoard::new();
        board.publish(notice(NotificationKind::Status, "Memproses..."));

        tokio::time::advance(Duration::from_secs(4)).await;
        board.publish(notice(NotificationKind::Success, "Selesai"));

        tokio::time::advance(Duration::from_secs(4)).await;
        let visible = board.current().expect("second notice still visible");
        assert_eq!(visible.content, "Selesai");
        assert_eq!(visible.kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn dismiss_clears_immediately() {
        let board = NoticeBoard::new();
        board.publish(notice(NotificationKind::Error, "Gagal"));
        board.dismiss();
        assert!(board.current().is_none());
    }

    #[tokio::test]
    async fn malformed_frame_is_dropped() {
        let board = NoticeBoard::new();
        board.publish(notice(NotificationKind::Status, "Memproses..."));
        handle_frame("{not json", &board);
        handle_frame(r#"{"type":"shout","content":"x"}"#, &board);
        let visible = board.current().expect("existing notice untouched");
        assert_eq!(visible.content, "Memproses...");
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let mut backoff = Backoff::new();
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
        for _ in 0..16 {
            backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), MAX_BACKOFF);
        assert_eq!(backoff.next_delay(), MAX_BACKOFF);
    }

    #[test]
    fn short_lived_connection_does_not_reset_backoff() {
        let mut backoff = Backoff::new();
        backoff.next_delay();
        backoff.next_delay();
        let grown = backoff.next_delay();
        assert!(grown > Duration::from_millis(100));

        // An accept-then-drop connection keeps the accumulated delay.
        backoff.note_connection_lived(Duration::from_millis(5));
        assert!(backoff.next_delay() > grown);

        // Only a connection that held for a while earns a reset.
        backoff.note_connection_lived(STABLE_AFTER);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn valid_frame_publishes() {
        let board = NoticeBoard::new();
        handle_frame(r#"{"type":"error","content":"Analisis gagal"}"#, &board);
        let visible = board.current().expect("frame published");
        assert_eq!(visible.kind, NotificationKind::Error);
        assert_eq!(visible.content, "Analisis gagal");
    }
}
