//! Dedup filter: recipients eligible for the next batch.

use std::collections::HashSet;

use crate::domain::{Recipient, SendRecord};

/// Recipients with a destination address and no SendRecord yet, in source
/// order, deduplicated by key.
///
/// Must be computed fresh against the ledger at the start of every run:
/// that is what makes a resumed run skip everyone the interrupted run
/// already reached. Never cache the result across runs.
///
/// A recipient without an address is silently absent, not an error.
pub fn pending_recipients(recipients: &[Recipient], ledger: &[SendRecord]) -> Vec<Recipient> {
    let already_sent: HashSet<&str> = ledger
        .iter()
        .map(|record| record.recipient_key.as_str())
        .collect();

    let mut seen_this_batch = HashSet::new();
    recipients
        .iter()
        .filter(|recipient| recipient.email.is_some())
        .filter(|recipient| !already_sent.contains(recipient.key.as_str()))
        .filter(|recipient| seen_this_batch.insert(recipient.key.clone()))
        .cloned()
        .collect()
}
