//! Type-safe identifier wrappers.
//!
//! Readings and to-do items use sequential integers handed out by their
//! owning store (starting at 1, never reused). Stream subscribers are
//! keyed by a UUID v7 so a registry entry can never collide with a
//! recycled counter value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a `u64` sequence number.
///
/// The wrapper serializes as a bare JSON number.
macro_rules! define_seq_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The first identifier a fresh store hands out.
            pub const FIRST: Self = Self(1);

            /// Return the inner sequence number.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Return the identifier that follows this one.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_seq_id! {
    /// Identifier assigned to a sensor reading at ingestion.
    ReadingId
}

define_seq_id! {
    /// Identifier of a to-do item.
    TodoId
}

/// Identity of one live stream connection in the subscriber registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sequence_ids_serialize_as_numbers() {
        let json = serde_json::to_value(ReadingId(7)).unwrap();
        assert_eq!(json, serde_json::json!(7));
    }

    #[test]
    fn next_advances_by_one() {
        assert_eq!(TodoId::FIRST.next(), TodoId(2));
        assert_eq!(ReadingId(u64::MAX).next(), ReadingId(u64::MAX));
    }

    #[test]
    fn subscriber_ids_are_unique() {
        assert_ne!(SubscriberId::new(), SubscriberId::new());
    }
}
