//! OpenLog port - the append-only record of tracking-pixel retrievals.

use async_trait::async_trait;

use crate::domain::{CourierError, OpenEvent};

/// Written by the correlation receiver, read by the reconciler.
///
/// # Contract
/// - Appends from concurrent requests must each land intact; if the
///   underlying storage serializes appends, that is sufficient.
/// - Every retrieval is logged, including duplicates and events whose
///   tracking id matches no SendRecord.
/// - A log that does not exist yet reads as empty.
#[async_trait]
pub trait OpenLog: Send + Sync {
    async fn append(&self, event: OpenEvent) -> Result<(), CourierError>;

    async fn scan(&self) -> Result<Vec<OpenEvent>, CourierError>;
}
