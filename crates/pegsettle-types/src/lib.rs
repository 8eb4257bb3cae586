//! # pegsettle-types
//!
//! Shared types, errors, and configuration for the **pegsettle** trade
//! settlement core.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`PegHash`], [`ZoneId`], [`OrganizationId`], [`NegotiationId`]
//! - **Pegs**: [`AssetPeg`], [`FiatPeg`], [`AssetPegWallet`], [`FiatPegWallet`]
//! - **Negotiation model**: [`Negotiation`], [`NegotiationStatus`], [`Party`], [`SignNegotiationBody`]
//! - **Escrow model**: [`Order`], [`OrderDetails`]
//! - **ACL model**: [`Acl`], [`AclAccount`], [`Organization`], [`Capability`]
//! - **Reputation model**: [`AccountReputation`], [`TraderFeedback`], [`FeedbackCategory`]
//! - **Account directory**: [`PublicKeyResolver`], [`AccountDirectory`]
//! - **Configuration**: [`LedgerConfig`], [`BatchMode`], [`TelemetryConfig`]
//! - **Errors**: [`PegsettleError`] with `PS_ERR_` prefix codes, [`ErrorKind`]
//! - **Store layout**: [`keys`]

pub mod acl;
pub mod block;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod events;
pub mod ids;
pub mod keys;
pub mod negotiation;
pub mod order;
pub mod peg;
pub mod reputation;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testkit;

pub use acl::*;
pub use block::*;
pub use config::*;
pub use directory::*;
pub use error::*;
pub use events::*;
pub use ids::{Address, NegotiationId, OrganizationId, PegHash, ZoneId};
pub use negotiation::*;
pub use order::*;
pub use peg::*;
pub use reputation::*;

// Constants and key builders are accessed via their modules
// (not re-exported to avoid name collisions).
