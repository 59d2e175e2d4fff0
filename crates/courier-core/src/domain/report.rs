//! Reconciliation output: one status row per recipient, plus summary counts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::records::log_time;
use super::RecipientKey;

/// Whether the latest campaign pass reached this recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SendStatus {
    #[serde(rename = "Sent")]
    Sent,
    #[serde(rename = "Not Sent")]
    NotSent,
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStatus::Sent => "Sent".fmt(f),
            SendStatus::NotSent => "Not Sent".fmt(f),
        }
    }
}

/// Whether any open event was correlated with the latest send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpenStatus {
    #[serde(rename = "Opened")]
    Opened,
    #[serde(rename = "Not Opened")]
    NotOpened,
}

impl fmt::Display for OpenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenStatus::Opened => "Opened".fmt(f),
            OpenStatus::NotOpened => "Not Opened".fmt(f),
        }
    }
}

/// One reconciled row. Derived, never persisted as state: recomputed from
/// the recipient source, the send ledger and the open log on every run.
///
/// Field order is the report column order; the status columns come first
/// so the report scans well.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    pub recipient_key: RecipientKey,
    pub send_status: SendStatus,
    pub open_status: OpenStatus,
    #[serde(with = "log_time::option")]
    pub last_sent_time: Option<DateTime<Utc>>,
    #[serde(with = "log_time::option")]
    pub first_open_time: Option<DateTime<Utc>>,
    pub name: String,
    pub email: Option<String>,
}

/// Campaign-level totals derived from the status rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignCounts {
    pub recipients: usize,
    pub sent: usize,
    pub opened: usize,
}

impl CampaignCounts {
    pub fn from_rows(rows: &[StatusRow]) -> Self {
        let mut counts = Self {
            recipients: rows.len(),
            ..Self::default()
        };
        for row in rows {
            if row.send_status == SendStatus::Sent {
                counts.sent += 1;
            }
            if row.open_status == OpenStatus::Opened {
                counts.opened += 1;
            }
        }
        counts
    }

    /// Unique opens as a percentage of sends. Zero sends yields 0.0.
    pub fn open_rate(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            self.opened as f64 / self.sent as f64 * 100.0
        }
    }
}
