//! Domain identifiers (opaque, string-form IDs).
//!
//! Both identifiers travel through delimited-text logs and tracking URLs, so
//! they are stored in their textual form. The Phantom type parameter keeps
//! `TrackingId` and `RecipientKey` from being mixed up at compile time while
//! sharing one implementation.
//!
//! A `TrackingId` produced by the generator is 128 random bits rendered as
//! canonical UUID text; the open log may also carry arbitrary strings taken
//! verbatim from request paths, so the type itself accepts any string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for each ID kind.
pub trait IdMarker: Send + Sync + 'static {}

/// Generic string-backed identifier.
///
/// `T` is PhantomData: no runtime cost, compile-time separation only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Marker type for tracking identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tracking {}

impl IdMarker for Tracking {}

/// Marker type for recipient keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Company {}

impl IdMarker for Company {}

/// Identifier of one send attempt; embedded in the tracking pixel URL.
pub type TrackingId = Id<Tracking>;

/// Unique key of a recipient in the recipient source.
pub type RecipientKey = Id<Company>;
