//! Domain model (IDs, recipients, records, report rows, message rendering).

pub mod errors;
pub mod ids;
pub mod message;
pub mod recipient;
pub mod records;
pub mod report;

pub use errors::CourierError;
pub use ids::{RecipientKey, TrackingId};
pub use message::{MessageTemplate, RenderedMessage};
pub use recipient::Recipient;
pub use records::{OpenEvent, SendRecord};
pub use report::{CampaignCounts, OpenStatus, SendStatus, StatusRow};
