//! # pegsettle-app
//!
//! The [`Ledger`] facade the external runtime drives, one committed
//! message at a time:
//!
//! - [`Ledger::deliver`]: route a [`Msg`] to its handler under the
//!   configured batch mode and return the emitted events
//! - [`Ledger::query`]: route a [`Query`] to its querier
//! - [`Ledger::settle`]: release an executed order's custody
//! - [`Ledger::init_genesis`] / [`Ledger::export_genesis`]
//! - [`state_digest`]: deterministic fingerprint of the whole store
//! - [`telemetry::init_tracing`]: structured logging setup

pub mod digest;
pub mod genesis;
pub mod ledger;
pub mod msg;
pub mod telemetry;

pub use digest::state_digest;
pub use genesis::GenesisState;
pub use ledger::{Ledger, Settlement};
pub use msg::{Msg, Query};
