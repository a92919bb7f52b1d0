//! Forwards receiver availability to every relay.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::collaborators::{ReceiverStatus, StatusEvent};
use crate::protocol::Message;

use super::registry::RelayRegistry;

// ============================================================================
// StatusBroadcaster
// ============================================================================

/// Turns `serviceUp`/`serviceDown` events into `shim:/serviceUp` and
/// `shim:/serviceDown` broadcasts.
///
/// Stops when dropped, when [`StatusBroadcaster::stop`] is called, or when
/// the status source closes its event channel.
///
/// Delivery is bounded by the capacity of the status source's broadcast
/// channel. When the broadcaster falls behind, the skipped events are lost;
/// it then re-announces every receiver the source still knows as
/// `shim:/serviceUp`. Receivers that went down during the gap are not
/// reported.
pub struct StatusBroadcaster {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusBroadcaster {
    /// Subscribes to `status` and starts forwarding to `registry`.
    #[must_use]
    pub fn spawn(status: Arc<dyn ReceiverStatus>, registry: Arc<RelayRegistry>) -> Self {
        let mut events = status.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let message = Self::message_for(&event);
                        trace!(subject = %message.subject, relays = registry.len(), "Broadcasting status");
                        registry.broadcast(&message);
                    }

                    Err(RecvError::Lagged(skipped)) => {
                        let receivers = status.receivers();
                        warn!(skipped, known = receivers.len(), "Status broadcaster lagged, re-announcing receivers");
                        for receiver in receivers {
                            registry.broadcast(&Message::service_up(&receiver.id));
                        }
                    }

                    Err(RecvError::Closed) => {
                        debug!("Status event channel closed");
                        break;
                    }
                }
            }
        });

        Self {
            task: Mutex::new(Some(task)),
        }
    }

    /// Maps a status event to its relay message.
    #[must_use]
    pub fn message_for(event: &StatusEvent) -> Message {
        match event {
            StatusEvent::ServiceUp { id } => Message::service_up(id),
            StatusEvent::ServiceDown { id } => Message::service_down(id),
        }
    }

    /// Stops forwarding.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for StatusBroadcaster {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Tests
// ============================================================================
