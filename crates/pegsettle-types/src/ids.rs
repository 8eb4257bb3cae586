//! Identifiers used throughout pegsettle.
//!
//! Addresses, peg hashes, zone and organization ids are opaque byte strings.
//! They serialize as lowercase hex and order lexicographically by their raw
//! bytes, which is also the order in which the store iterates them.
//!
//! [`NegotiationId`] is the one composite identifier: the raw concatenation
//! `buyer ∥ seller ∥ peg_hash`. It is built in exactly one place
//! ([`NegotiationId::derive`]) and every store key that refers to a trade
//! goes through it. Addresses entering the ledger are checked to be
//! [`ADDRESS_LEN`] bytes ([`Address::ensure_valid`]), which keeps the
//! concatenation unambiguous.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::ADDRESS_LEN;
use crate::{PegsettleError, Result};

/// Serde adapter storing raw bytes as a hex string.
pub mod hex_bytes {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

macro_rules! opaque_bytes_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
        pub struct $name(Vec<u8>);

        impl $name {
            #[must_use]
            pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
                Self(bytes.into())
            }

            /// Parse from a hex string.
            pub fn from_hex(s: &str) -> Result<Self> {
                hex::decode(s).map(Self).map_err(|e| PegsettleError::InvalidInput {
                    field: $label,
                    reason: e.to_string(),
                })
            }

            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Reject the empty identifier.
            pub fn ensure_present(&self) -> Result<()> {
                if self.0.is_empty() {
                    return Err(PegsettleError::InvalidInput {
                        field: $label,
                        reason: "must not be empty".into(),
                    });
                }
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(&self.0))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                hex_bytes::serialize(&self.0, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                hex_bytes::deserialize(deserializer).map(Self)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

opaque_bytes_id!(
    /// Ledger account address.
    Address,
    "address"
);

impl Address {
    /// Reject anything but an [`ADDRESS_LEN`]-byte address.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.0.len() != ADDRESS_LEN {
            return Err(PegsettleError::InvalidInput {
                field: "address",
                reason: format!("expected {ADDRESS_LEN} bytes, got {}", self.0.len()),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PegHash
// ---------------------------------------------------------------------------

opaque_bytes_id!(
    /// Content identifier of one pegged asset or fiat instrument.
    PegHash,
    "peg_hash"
);

// ---------------------------------------------------------------------------
// ZoneId / OrganizationId
// ---------------------------------------------------------------------------

opaque_bytes_id!(
    /// Top tier of the delegated-authority hierarchy.
    ZoneId,
    "zone_id"
);

opaque_bytes_id!(
    /// Mid tier of the delegated-authority hierarchy.
    OrganizationId,
    "organization_id"
);

// ---------------------------------------------------------------------------
// NegotiationId
// ---------------------------------------------------------------------------

/// Composite trade key: `buyer ∥ seller ∥ peg_hash`.
///
/// Shared by the negotiation record and its escrow order. The argument
/// order is fixed; which party acted first never changes the id. Only
/// injective when both addresses pass [`Address::ensure_valid`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NegotiationId(Vec<u8>);

impl NegotiationId {
    #[must_use]
    pub fn derive(buyer: &Address, seller: &Address, peg_hash: &PegHash) -> Self {
        let mut bytes =
            Vec::with_capacity(buyer.as_bytes().len() + seller.as_bytes().len() + peg_hash.as_bytes().len());
        bytes.extend_from_slice(buyer.as_bytes());
        bytes.extend_from_slice(seller.as_bytes());
        bytes.extend_from_slice(peg_hash.as_bytes());
        Self(bytes)
    }

    /// Rebuild from raw key bytes (e.g. taken from a store key).
    #[must_use]
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| PegsettleError::InvalidInput {
                field: "negotiation_id",
                reason: e.to_string(),
            })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NegotiationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for NegotiationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        hex_bytes::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for NegotiationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        hex_bytes::deserialize(deserializer).map(Self)
    }
}
