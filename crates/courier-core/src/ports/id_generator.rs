//! IdGenerator port - tracking ID 生成の抽象化
//!
//! Tracking identifiers end up in URLs that untrusted third parties can
//! request, so they must be unguessable: 128 fully random bits, no
//! timestamp prefix, and nothing derived from the recipient. The canonical
//! UUID text form keeps them readable in the ledger and in URLs.

use rand::random;
use uuid::Uuid;

use crate::domain::TrackingId;

/// IdGenerator は send ごとに新しい tracking ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn tracking_id(&self) -> TrackingId;
}

/// Production generator: 128 random bits in UUID text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn tracking_id(&self) -> TrackingId {
        TrackingId::new(Uuid::from_u128(random::<u128>()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_ids() {
        let generator = RandomIdGenerator;

        let id1 = generator.tracking_id();
        let id2 = generator.tracking_id();
        let id3 = generator.tracking_id();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn ids_are_canonical_uuid_text() {
        let id = RandomIdGenerator.tracking_id();
        let text = id.as_str();

        // 8-4-4-4-12, lowercase hex.
        assert_eq!(text.len(), 36);
        assert_eq!(text.matches('-').count(), 4);
        assert!(text
            .chars()
            .all(|c| c == '-' || c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
