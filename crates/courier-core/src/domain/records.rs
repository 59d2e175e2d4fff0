//! Log records: the rows of the send ledger and the open-event log.
//!
//! Both logs are append-only delimited text. Records are never mutated or
//! deleted once written; resumability and reconciliation both depend on that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecipientKey, TrackingId};

/// Serde helpers for the timestamp format used in the persisted logs.
///
/// The logs predate this implementation, so the format is fixed:
/// `%Y-%m-%d %H:%M:%S`, no timezone suffix, interpreted as UTC.
pub mod log_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }

    /// Same format for optional timestamps; absent renders as an empty field.
    pub mod option {
        use super::FORMAT;
        use chrono::{DateTime, NaiveDateTime, Utc};
        use serde::{self, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(
            time: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match time {
                Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
                None => serializer.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            if raw.is_empty() {
                return Ok(None);
            }
            NaiveDateTime::parse_from_str(&raw, FORMAT)
                .map(|naive| Some(naive.and_utc()))
                .map_err(serde::de::Error::custom)
        }
    }
}

/// One successful send, appended to the ledger immediately after the
/// transport reports success and before the next recipient is attempted.
///
/// Field order is the on-disk column order:
/// `tracking_id,recipient_key,destination_address,sent_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRecord {
    pub tracking_id: TrackingId,
    pub recipient_key: RecipientKey,
    pub destination_address: String,
    #[serde(with = "log_time")]
    pub sent_time: DateTime<Utc>,
}

/// One retrieval of a tracking pixel, appended by the correlation receiver.
///
/// Duplicates are expected (mail clients prefetch, recipients reopen), and
/// the tracking id is taken verbatim from the request path: it may reference
/// no SendRecord at all. Orphans are still logged.
///
/// On-disk column order: `opened_time,tracking_id,client_signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenEvent {
    #[serde(with = "log_time")]
    pub opened_time: DateTime<Utc>,
    pub tracking_id: TrackingId,
    pub client_signature: String,
}
