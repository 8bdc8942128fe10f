//! Observer fan-out and display front ends.
//!
//! The session publishes [`FieldUpdate`]s into a broadcast channel through
//! a [`FieldPublisher`]; a dedicated render task drains a receiver into one
//! [`Observer`]. Publishing never blocks: with no receiver the update is
//! dropped, and a lagging receiver loses the oldest updates rather than
//! stalling the receive loop.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::constants::FIELD_EVENT_CAPACITY;
use crate::core::fields::{Field, FieldUpdate};
use crate::core::traits::Observer;

mod dashboard;
mod text;

pub use dashboard::{GraphicalObserver, spawn_key_listener};
pub use text::TextObserver;

/// Sending side of the field-update channel.
#[derive(Debug, Clone)]
pub struct FieldPublisher {
    tx: broadcast::Sender<FieldUpdate>,
}

impl FieldPublisher {
    /// Publish one field update. Fire and forget.
    pub fn update(&self, field: Field, value: impl Into<String>) {
        let _ = self.tx.send(FieldUpdate::new(field, value));
    }

    /// Publish a status line.
    pub fn status(&self, text: impl Into<String>) {
        self.update(Field::Status, text);
    }

    /// Publish a non-fatal error.
    pub fn error(&self, text: impl Into<String>) {
        self.update(Field::Error, text);
    }

    /// A fresh receiver on the same channel.
    pub fn subscribe(&self) -> broadcast::Receiver<FieldUpdate> {
        self.tx.subscribe()
    }
}

/// Create the field-update channel.
pub fn channel() -> (FieldPublisher, broadcast::Receiver<FieldUpdate>) {
    let (tx, rx) = broadcast::channel(FIELD_EVENT_CAPACITY);
    (FieldPublisher { tx }, rx)
}

/// Spawn the render task: drains field updates into one observer until
/// every publisher is gone. Dropping the last [`FieldPublisher`] ends the
/// task and with it the observer, which is what restores the terminal in
/// dashboard mode.
pub fn spawn_render_task(
    mut receiver: broadcast::Receiver<FieldUpdate>,
    mut observer: Box<dyn Observer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(update) => observer.update(update.field, &update.value),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "observer lagged, old updates dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Observer that ignores every update.
///
/// Used when the client runs log-only with no field display.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn update(&mut self, _field: Field, _value: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<(Field, String)>>>,
    }

    impl Observer for Recorder {
        fn update(&mut self, field: Field, value: &str) {
            self.seen.lock().unwrap().push((field, value.to_string()));
        }
    }

    #[tokio::test]
    async fn test_publisher_delivers_updates() {
        let (publisher, mut rx) = channel();
        publisher.update(Field::Source, "N0CALL");
        let update = rx.recv().await.unwrap();
        assert_eq!(update.field, Field::Source);
        assert_eq!(update.value, "N0CALL");
    }

    #[tokio::test]
    async fn test_publish_without_receivers_is_dropped() {
        let (publisher, rx) = channel();
        drop(rx);
        publisher.status("no one listening");
        publisher.error("still no one");
    }

    #[tokio::test]
    async fn test_render_task_feeds_observer_in_order() {
        let recorder = Recorder::default();
        let seen = Arc::clone(&recorder.seen);

        let (publisher, rx) = channel();
        let task = spawn_render_task(rx, Box::new(recorder));

        publisher.status("Connecting");
        publisher.update(Field::StreamId, "7");
        publisher.error("boom");
        drop(publisher);

        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Field::Status, "Connecting".to_string()),
                (Field::StreamId, "7".to_string()),
                (Field::Error, "boom".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_observer_ignores_updates() {
        let mut observer = NullObserver;
        observer.update(Field::Status, "anything");
    }
}
