//! SendLedger port - the append-only record of successful sends.

use async_trait::async_trait;

use crate::domain::{CourierError, SendRecord};

/// The send ledger is the only duplicate-send defense this system has: a
/// run resumed after a crash consults it before sending anything.
///
/// # Contract
/// - `append` is durable when it returns: a crash immediately after must
///   not lose the record.
/// - `scan` returns every record ever appended, in append order. A ledger
///   that does not exist yet reads as empty.
///
/// This trait is the seam for swapping implementations later; v1 ships a
/// delimited-text file and an in-memory double for tests.
#[async_trait]
pub trait SendLedger: Send + Sync {
    async fn append(&self, record: SendRecord) -> Result<(), CourierError>;

    async fn scan(&self) -> Result<Vec<SendRecord>, CourierError>;
}
