//! Recipient: one row of the externally-owned recipient source.

use super::RecipientKey;

/// Fallback used in rendered messages when the source has no display name.
pub const FALLBACK_DISPLAY_NAME: &str = "Valued Partner";

/// One recipient, read-only to the pipeline.
///
/// A recipient without a destination address is permanently excluded from
/// sending. That is not an error: the dedup filter simply never yields it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub key: RecipientKey,
    pub name: String,
    pub email: Option<String>,
}

impl Recipient {
    pub fn new(
        key: impl Into<RecipientKey>,
        name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            email,
        }
    }

    /// Display name for message rendering, with the generic fallback.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_when_blank() {
        let named = Recipient::new("A", "Acme GmbH", Some("a@x.com".into()));
        assert_eq!(named.display_name(), "Acme GmbH");

        let blank = Recipient::new("B", "   ", Some("b@x.com".into()));
        assert_eq!(blank.display_name(), FALLBACK_DISPLAY_NAME);
    }
}
