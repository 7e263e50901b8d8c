//! Message transport contract.
//!
//! The dialog only ever sees this boundary: it receives one
//! [`InboundEvent`] at a time and answers with prompts (optionally
//! carrying a choice keyboard) or result blocks (optionally carrying
//! media). Everything about rendering and delivery lives behind the
//! trait, so the controller stays transport-agnostic and testable.

use async_trait::async_trait;
use roomscout_core::types::DbId;

/// Errors from the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The transport API rejected a call.
    #[error("Transport API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// One selectable button of a prompt keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub data: String,
}

/// A grid of choices attached to a prompt.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Choice>>,
}

impl Keyboard {
    /// One choice per row, in order.
    pub fn single_column(choices: Vec<Choice>) -> Self {
        Self {
            rows: choices.into_iter().map(|c| vec![c]).collect(),
        }
    }
}

/// The identity attached to an inbound event.
#[derive(Debug, Clone)]
pub struct EventUser {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// What the user sent: free text or a selection from a presented
/// keyboard.
#[derive(Debug, Clone)]
pub enum EventPayload {
    Text(String),
    Choice(String),
}

/// One inbound user event.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user: EventUser,
    pub payload: EventPayload,
}

/// A message transport the dialog can run over.
#[async_trait]
pub trait Transport {
    /// Block until the next user event arrives.
    async fn next_event(&mut self) -> Result<InboundEvent, TransportError>;

    /// Deliver a dialog prompt, optionally with a choice keyboard.
    async fn send_prompt(
        &self,
        user_id: DbId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Deliver a result block, optionally with attached media URLs.
    async fn send_block(
        &self,
        user_id: DbId,
        text: &str,
        media: &[String],
    ) -> Result<(), TransportError>;
}
