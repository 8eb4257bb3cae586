//! Store key layout.
//!
//! One tag byte per entity kind, followed by the entity's identifier bytes.
//! All components share one store; the tags keep their ranges disjoint.

use crate::{Address, NegotiationId, OrganizationId, ZoneId};

pub const ZONE_PREFIX: u8 = 0x01;
pub const ORGANIZATION_PREFIX: u8 = 0x02;
pub const ACL_ACCOUNT_PREFIX: u8 = 0x03;
pub const ACL_AUTHORITY_PREFIX: u8 = 0x04;
pub const NEGOTIATION_PREFIX: u8 = 0x10;
pub const ORDER_PREFIX: u8 = 0x20;
pub const REPUTATION_PREFIX: u8 = 0x30;

fn tagged(tag: u8, id: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + id.len());
    key.push(tag);
    key.extend_from_slice(id);
    key
}

#[must_use]
pub fn zone_key(id: &ZoneId) -> Vec<u8> {
    tagged(ZONE_PREFIX, id.as_bytes())
}

#[must_use]
pub fn organization_key(id: &OrganizationId) -> Vec<u8> {
    tagged(ORGANIZATION_PREFIX, id.as_bytes())
}

#[must_use]
pub fn acl_account_key(address: &Address) -> Vec<u8> {
    tagged(ACL_ACCOUNT_PREFIX, address.as_bytes())
}

#[must_use]
pub fn acl_authority_key() -> Vec<u8> {
    vec![ACL_AUTHORITY_PREFIX]
}

#[must_use]
pub fn negotiation_key(id: &NegotiationId) -> Vec<u8> {
    tagged(NEGOTIATION_PREFIX, id.as_bytes())
}

#[must_use]
pub fn order_key(id: &NegotiationId) -> Vec<u8> {
    tagged(ORDER_PREFIX, id.as_bytes())
}

#[must_use]
pub fn reputation_key(address: &Address) -> Vec<u8> {
    tagged(REPUTATION_PREFIX, address.as_bytes())
}

/// Strip the tag byte, returning the identifier part of a key.
#[must_use]
pub fn key_suffix(key: &[u8]) -> &[u8] {
    key.get(1..).unwrap_or_default()
}
