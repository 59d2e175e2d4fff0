//! In-memory implementations for tests and wiring checks.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::{CourierError, OpenEvent, RenderedMessage, SendRecord};
use crate::ports::{OpenLog, SendLedger, Transport, TransportError};

/// Append-only in-memory send ledger.
#[derive(Debug, Default)]
pub struct InMemorySendLedger {
    records: Mutex<Vec<SendRecord>>,
}

impl InMemorySendLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SendLedger for InMemorySendLedger {
    async fn append(&self, record: SendRecord) -> Result<(), CourierError> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<SendRecord>, CourierError> {
        Ok(self.records.lock().await.clone())
    }
}

/// Append-only in-memory open-event log.
#[derive(Debug, Default)]
pub struct InMemoryOpenLog {
    events: Mutex<Vec<OpenEvent>>,
}

impl InMemoryOpenLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OpenLog for InMemoryOpenLog {
    async fn append(&self, event: OpenEvent) -> Result<(), CourierError> {
        self.events.lock().await.push(event);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<OpenEvent>, CourierError> {
        Ok(self.events.lock().await.clone())
    }
}

/// One message accepted by [`InMemoryTransport`], with the monotonic time
/// of acceptance so rate-limiter behavior is observable from tests.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub sent_at: Instant,
}

/// Transport double: records everything, optionally rejects chosen
/// addresses or fails authentication outright.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    outbox: Mutex<Vec<SentMessage>>,
    rejected: HashSet<String>,
    auth_failure: bool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject delivery to the given addresses; everything else succeeds.
    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            rejected: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Fail every send with an authentication error.
    pub fn with_auth_failure() -> Self {
        Self {
            auth_failure: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, message: &RenderedMessage) -> Result<(), TransportError> {
        if self.auth_failure {
            return Err(TransportError::Auth("535 authentication failed".into()));
        }
        if self.rejected.contains(&message.to) {
            return Err(TransportError::Delivery(format!(
                "550 mailbox unavailable: {}",
                message.to
            )));
        }

        self.outbox.lock().await.push(SentMessage {
            to: message.to.clone(),
            subject: message.subject.clone(),
            html_body: message.html_body.clone(),
            sent_at: Instant::now(),
        });
        Ok(())
    }
}
