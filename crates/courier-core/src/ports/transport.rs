//! Transport port - the outbound message-submission channel.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RenderedMessage;

/// Transport failures, split by blast radius.
///
/// The send loop aborts the whole run on `Auth` and skips a single
/// recipient on `Delivery`; nothing else is allowed to escape the seam.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Credentials rejected. Fatal to the run.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// This one message could not be delivered. The recipient stays
    /// eligible for the next run because no ledger record is written.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// One send per call, success or a classified failure. No retries at this
/// layer: a failed recipient is picked up by the next run via the dedup
/// filter.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: &RenderedMessage) -> Result<(), TransportError>;
}
