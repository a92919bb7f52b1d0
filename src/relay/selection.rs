//! Receiver selection handshake.
//!
//! Runs one selection per `main:/selectReceiverBegin`:
//!
//! ```text
//! Idle ──► AwaitingSelection ──┬──► Completed              shim:/selectReceiverEnd
//!                              ├──► CancelledByUser        shim:/selectReceiverCancelled
//!                              ├──► CancelledByTypeSwitch  shim:/selectReceiverCancelled + load sender
//!                              └──► Failed                 shim:/selectReceiverCancelled
//! ```
//!
//! A selection that resolves after the relay closed sends into inert
//! connections; nothing is reported.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, warn};

use crate::collaborators::{LoadSenderRequest, ReceiverSelector, SenderLoader};
use crate::protocol::{MediaType, MediaTypes, Message, Selection};

use super::core::Relay;

// ============================================================================
// SelectionOutcome
// ============================================================================

/// Terminal state of one selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// The user picked a receiver for the cast application.
    Completed(Selection),
    /// The user dismissed the selector.
    CancelledByUser,
    /// The user picked a different media type; another sender takes over.
    CancelledByTypeSwitch(Selection),
    /// The selector failed.
    Failed,
    /// A selection was already in flight for this relay; nothing was sent.
    AlreadyInFlight,
}

// ============================================================================
// SelectionCoordinator
// ============================================================================

/// Mediates between a relay's content side and the receiver selector.
pub struct SelectionCoordinator {
    selector: Arc<dyn ReceiverSelector>,
    sender_loader: Arc<dyn SenderLoader>,
    allowed: MediaTypes,
}

impl SelectionCoordinator {
    /// Creates a coordinator.
    ///
    /// Selections always prefer [`MediaType::App`]; `allowed` bounds what the
    /// user may switch to.
    #[must_use]
    pub fn new(
        selector: Arc<dyn ReceiverSelector>,
        sender_loader: Arc<dyn SenderLoader>,
        allowed: MediaTypes,
    ) -> Self {
        Self {
            selector,
            sender_loader,
            allowed,
        }
    }

    /// Runs a selection for `relay` and reports the result to its content side.
    pub async fn run(&self, relay: &Relay) -> SelectionOutcome {
        let Some(_guard) = relay.try_begin_selection() else {
            debug!(relay_id = %relay.id(), "Selection already in flight, ignoring request");
            return SelectionOutcome::AlreadyInFlight;
        };

        let outcome = match self.selector.selection(MediaType::App, self.allowed).await {
            Ok(None) => SelectionOutcome::CancelledByUser,
            Ok(Some(selection)) if selection.is_app() => SelectionOutcome::Completed(selection),
            Ok(Some(selection)) => SelectionOutcome::CancelledByTypeSwitch(selection),
            Err(e) => {
                // TODO: surface the failure to content once the shim protocol has an error subject.
                warn!(relay_id = %relay.id(), error = %e, "Receiver selection failed");
                SelectionOutcome::Failed
            }
        };

        debug!(relay_id = %relay.id(), ?outcome, "Selection finished");
        self.report(relay, &outcome).await;

        outcome
    }

    /// Sends the outcome to content and starts an alternate sender if needed.
    async fn report(&self, relay: &Relay, outcome: &SelectionOutcome) {
        let content = relay.content();

        match outcome {
            SelectionOutcome::Completed(selection) => {
                match Message::select_receiver_end(selection) {
                    Ok(message) => content.send(message),
                    Err(e) => {
                        warn!(relay_id = %relay.id(), error = %e, "Failed to encode selection");
                        content.send(Message::select_receiver_cancelled());
                    }
                }
            }

            SelectionOutcome::CancelledByUser | SelectionOutcome::Failed => {
                content.send(Message::select_receiver_cancelled());
            }

            SelectionOutcome::CancelledByTypeSwitch(selection) => {
                content.send(Message::select_receiver_cancelled());

                let Some(identity) = relay.identity() else {
                    warn!(
                        relay_id = %relay.id(),
                        media_type = %selection.media_type,
                        "No tab to load sender into"
                    );
                    return;
                };

                let request = LoadSenderRequest::new(identity, selection.clone());
                if let Err(e) = self.sender_loader.load_sender(request).await {
                    warn!(
                        relay_id = %relay.id(),
                        tab_id = %identity.tab_id,
                        frame_id = %identity.frame_id,
                        error = %e,
                        "Failed to load sender"
                    );
                }
            }

            SelectionOutcome::AlreadyInFlight => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
