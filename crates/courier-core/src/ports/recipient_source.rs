//! RecipientSource port - the externally-owned recipient list.

use async_trait::async_trait;

use crate::domain::{CourierError, Recipient};

/// Read-only tabular source of recipients.
///
/// Two physical forms exist (delimited text and a named spreadsheet
/// sheet); both load into the same `Recipient` rows so the rest of the
/// pipeline never knows the difference. A missing source file is fatal to
/// a run, unlike the two logs.
#[async_trait]
pub trait RecipientSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Recipient>, CourierError>;
}
