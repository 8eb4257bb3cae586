//! # pegsettle-trade
//!
//! Trade lifecycle on top of the ACL authority:
//!
//! - [`NegotiationKeeper`]: bid changes and two-party signed confirmation
//! - [`OrderKeeper`]: escrow custody of asset and fiat pegs per trade
//! - [`ReputationKeeper`]: action counters and post-trade feedback
//! - [`TradeMsg`] / [`handle_trade_msg`]: inbound messages
//! - [`TradeQuery`] / [`query_trade`]: point lookups
//! - [`TradeGenesis`]: genesis import / export

use std::sync::Arc;

use pegsettle_acl::AclKeeper;
use pegsettle_store::Codec;
use pegsettle_types::{AccountDirectory, LedgerConfig};

pub mod escrow;
pub mod genesis;
pub mod handler;
pub mod msgs;
pub mod negotiation;
pub mod querier;
pub mod reputation;

#[cfg(test)]
mod test_support;

pub use escrow::OrderKeeper;
pub use genesis::{export_genesis, init_genesis, TradeGenesis};
pub use handler::handle_trade_msg;
pub use msgs::{ExecuteOrder, Feedback, SendAsset, SendFiat, TradeMsg};
pub use negotiation::{BidConfirmation, BidProposal, NegotiationKeeper};
pub use querier::{query_trade, TradeQuery};
pub use reputation::ReputationKeeper;

/// The three trade keepers wired over one codec and ACL keeper.
#[derive(Debug, Clone)]
pub struct TradeKeepers {
    pub negotiation: NegotiationKeeper,
    pub orders: OrderKeeper,
    pub reputation: ReputationKeeper,
}

impl TradeKeepers {
    #[must_use]
    pub fn new(
        codec: Arc<Codec>,
        acl: AclKeeper,
        directory: Arc<dyn AccountDirectory>,
        cfg: &LedgerConfig,
    ) -> Self {
        let orders = OrderKeeper::new(codec.clone(), acl.clone());
        let reputation = ReputationKeeper::new(codec.clone(), acl.clone(), orders.clone(), cfg);
        let negotiation = NegotiationKeeper::new(codec, acl, reputation.clone(), directory, cfg);
        Self {
            negotiation,
            orders,
            reputation,
        }
    }
}
