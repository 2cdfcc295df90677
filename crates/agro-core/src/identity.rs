//! # Identity Newtypes
//!
//! Identifier newtypes for the four record kinds. Each identifier is a
//! distinct type: you cannot pass a [`FarmId`] where a [`HarvestId`] is
//! expected, so a crop can never be filed under a farm by accident.
//!
//! All identifiers are UUID-backed and always valid by construction. They
//! are minted by the registry's create operations; callers only ever hold
//! identifiers that the registry handed out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        #[allow(clippy::new_without_default)]
        impl $name {
            /// Mint a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID (e.g. one read back from storage).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a rural producer.
    ProducerId
);

uuid_identifier!(
    /// Identifier of a farm.
    FarmId
);

uuid_identifier!(
    /// Identifier of a harvest (safra).
    HarvestId
);

uuid_identifier!(
    /// Identifier of a planted crop.
    CropId
);
