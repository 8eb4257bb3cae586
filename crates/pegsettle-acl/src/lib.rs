//! # pegsettle-acl
//!
//! Capability authority for the trade-settlement core.
//!
//! - [`AclKeeper`]: zone, organization, and account records plus the
//!   [`AclKeeper::require`] gate every other keeper calls first
//! - [`AclMsg`] / [`handle_acl_msg`]: inbound definition messages
//! - [`AclQuery`] / [`query_acl`]: point lookups
//! - [`AclGenesis`]: genesis import / export

pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod msgs;
pub mod querier;

pub use genesis::{export_genesis, init_genesis, AclGenesis, OrganizationEntry, ZoneEntry};
pub use handler::handle_acl_msg;
pub use keeper::AclKeeper;
pub use msgs::{AclMsg, DefineAcl, DefineOrganization, DefineZone};
pub use querier::{query_acl, AclQuery};
