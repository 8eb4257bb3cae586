//! Negotiation record and its signing payload.
//!
//! ```text
//!   (absent) --change--> PROPOSED --confirm(seller)--> SELLER_SIGNED --confirm(buyer)--+
//!                           |  ^                                                       |
//!                           +--+ change                                                v
//!                           +----confirm(buyer)--> BUYER_SIGNED --confirm(seller)--> CONFIRMED
//! ```
//!
//! Bid and time are mutable only in `PROPOSED`. `CONFIRMED` is terminal.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::hex_bytes;
use crate::{Address, NegotiationId, PegHash};

/// Which side of a trade an address is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Buyer,
    Seller,
}

impl Party {
    #[must_use]
    pub fn counterparty(self) -> Self {
        match self {
            Self::Buyer => Self::Seller,
            Self::Seller => Self::Buyer,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => f.write_str("buyer"),
            Self::Seller => f.write_str("seller"),
        }
    }
}

/// Raw ed25519 signature bytes as submitted by a party.
///
/// Kept as bytes so that malformed input survives decoding and is rejected
/// at verification time with a typed error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature(Vec<u8>);

impl Signature {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex_bytes::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        hex_bytes::deserialize(deserializer).map(Self)
    }
}

/// Derived lifecycle state of a [`Negotiation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NegotiationStatus {
    Proposed,
    BuyerSigned,
    SellerSigned,
    Confirmed,
}

impl NegotiationStatus {
    /// Whether bid and time may still change.
    #[must_use]
    pub fn is_mutable(self) -> bool {
        self == Self::Proposed
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Confirmed
    }
}

impl fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Proposed => "PROPOSED",
            Self::BuyerSigned => "BUYER_SIGNED",
            Self::SellerSigned => "SELLER_SIGNED",
            Self::Confirmed => "CONFIRMED",
        };
        f.write_str(s)
    }
}

/// Bilateral price proposal over one asset peg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiation {
    pub negotiation_id: NegotiationId,
    pub buyer_address: Address,
    pub seller_address: Address,
    pub peg_hash: PegHash,
    pub bid: i64,
    /// Validity window in blocks, counted from the seller's signing height.
    pub time: i64,
    pub buyer_signature: Option<Signature>,
    pub seller_signature: Option<Signature>,
    pub buyer_block_height: i64,
    pub seller_block_height: i64,
    pub buyer_contract_hash: String,
    pub seller_contract_hash: String,
}

impl Negotiation {
    /// Fresh unsigned proposal.
    #[must_use]
    pub fn proposed(buyer: Address, seller: Address, peg_hash: PegHash, bid: i64, time: i64) -> Self {
        Self {
            negotiation_id: NegotiationId::derive(&buyer, &seller, &peg_hash),
            buyer_address: buyer,
            seller_address: seller,
            peg_hash,
            bid,
            time,
            buyer_signature: None,
            seller_signature: None,
            buyer_block_height: 0,
            seller_block_height: 0,
            buyer_contract_hash: String::new(),
            seller_contract_hash: String::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> NegotiationStatus {
        match (&self.buyer_signature, &self.seller_signature) {
            (None, None) => NegotiationStatus::Proposed,
            (Some(_), None) => NegotiationStatus::BuyerSigned,
            (None, Some(_)) => NegotiationStatus::SellerSigned,
            (Some(_), Some(_)) => NegotiationStatus::Confirmed,
        }
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status().is_terminal()
    }

    /// Last block height at which the confirmed terms may be acted on.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.seller_block_height.saturating_add(self.time)
    }

    #[must_use]
    pub fn is_expired(&self, height: i64) -> bool {
        self.expires_at() < height
    }

    #[must_use]
    pub fn signature(&self, party: Party) -> Option<&Signature> {
        match party {
            Party::Buyer => self.buyer_signature.as_ref(),
            Party::Seller => self.seller_signature.as_ref(),
        }
    }

    #[must_use]
    pub fn address(&self, party: Party) -> &Address {
        match party {
            Party::Buyer => &self.buyer_address,
            Party::Seller => &self.seller_address,
        }
    }

    /// Record one side's signature together with its height and contract hash.
    pub fn record_signature(&mut self, party: Party, signature: Signature, height: i64, contract_hash: String) {
        match party {
            Party::Buyer => {
                self.buyer_signature = Some(signature);
                self.buyer_block_height = height;
                self.buyer_contract_hash = contract_hash;
            }
            Party::Seller => {
                self.seller_signature = Some(signature);
                self.seller_block_height = height;
                self.seller_contract_hash = contract_hash;
            }
        }
    }

    /// The terms both parties sign.
    #[must_use]
    pub fn sign_body(&self) -> SignNegotiationBody<'_> {
        SignNegotiationBody {
            buyer: &self.buyer_address,
            seller: &self.seller_address,
            peg_hash: &self.peg_hash,
            bid: self.bid,
            time: self.time,
        }
    }
}

/// Canonical terms covered by a negotiation signature.
#[derive(Debug, Clone, Copy)]
pub struct SignNegotiationBody<'a> {
    pub buyer: &'a Address,
    pub seller: &'a Address,
    pub peg_hash: &'a PegHash,
    pub bid: i64,
    pub time: i64,
}

impl SignNegotiationBody<'_> {
    /// Domain-separated bytes to sign. Variable-length fields carry a
    /// big-endian u32 length prefix.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(64 + self.buyer.as_bytes().len() * 2);
        payload.extend_from_slice(crate::constants::NEGOTIATION_SIGN_DOMAIN);
        for field in [self.buyer.as_bytes(), self.seller.as_bytes(), self.peg_hash.as_bytes()] {
            let len = u32::try_from(field.len()).unwrap_or(u32::MAX);
            payload.extend_from_slice(&len.to_be_bytes());
            payload.extend_from_slice(field);
        }
        payload.extend_from_slice(&self.bid.to_be_bytes());
        payload.extend_from_slice(&self.time.to_be_bytes());
        payload
    }
}
