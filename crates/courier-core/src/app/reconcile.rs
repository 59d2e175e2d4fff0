//! Reconciler: merge the three logs into one status row per recipient.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{
    OpenEvent, OpenStatus, Recipient, RecipientKey, SendRecord, SendStatus, StatusRow, TrackingId,
};

/// Pure merge over snapshot reads of the three sources.
///
/// 1. Reduce the open log to the earliest event per tracking id
///    (first open wins).
/// 2. Left-join sends with first opens on tracking id.
/// 3. Keep the most recent SendRecord per recipient key: only the latest
///    campaign pass is authoritative. Equal timestamps resolve to the later
///    log entry.
/// 4. Left-join the recipient source, in source order, statuses derived.
///
/// Orphan open events (ids matching no SendRecord) drop out at step 2.
/// Either log may be empty; everything then degrades to not-sent /
/// not-opened.
pub fn reconcile(
    recipients: &[Recipient],
    sends: &[SendRecord],
    opens: &[OpenEvent],
) -> Vec<StatusRow> {
    let mut first_opens: HashMap<&TrackingId, DateTime<Utc>> = HashMap::new();
    for event in opens {
        first_opens
            .entry(&event.tracking_id)
            .and_modify(|earliest| {
                if event.opened_time < *earliest {
                    *earliest = event.opened_time;
                }
            })
            .or_insert(event.opened_time);
    }

    let mut latest_send: HashMap<&RecipientKey, (DateTime<Utc>, Option<DateTime<Utc>>)> =
        HashMap::new();
    for record in sends {
        let keep = match latest_send.get(&record.recipient_key) {
            Some((current, _)) => record.sent_time >= *current,
            None => true,
        };
        if keep {
            let first_open = first_opens.get(&record.tracking_id).copied();
            latest_send.insert(&record.recipient_key, (record.sent_time, first_open));
        }
    }

    recipients
        .iter()
        .map(|recipient| {
            let joined = latest_send.get(&recipient.key);
            let last_sent_time = joined.map(|(sent, _)| *sent);
            let first_open_time = joined.and_then(|(_, open)| *open);

            StatusRow {
                recipient_key: recipient.key.clone(),
                send_status: if last_sent_time.is_some() {
                    SendStatus::Sent
                } else {
                    SendStatus::NotSent
                },
                open_status: if first_open_time.is_some() {
                    OpenStatus::Opened
                } else {
                    OpenStatus::NotOpened
                },
                last_sent_time,
                first_open_time,
                name: recipient.name.clone(),
                email: recipient.email.clone(),
            }
        })
        .collect()
}
