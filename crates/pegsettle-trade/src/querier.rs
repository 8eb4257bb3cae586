//! Read-only trade queries returning pretty JSON, or `None` when absent.

use serde::{Deserialize, Serialize};

use pegsettle_store::Context;
use pegsettle_types::{Address, NegotiationId, Result};

use crate::TradeKeepers;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", content = "id", rename_all = "snake_case")]
pub enum TradeQuery {
    Negotiation(NegotiationId),
    Order(NegotiationId),
    Reputation(Address),
}

pub fn query_trade(keepers: &TradeKeepers, ctx: &Context<'_>, query: &TradeQuery) -> Result<Option<Vec<u8>>> {
    match query {
        TradeQuery::Negotiation(id) => keepers
            .negotiation
            .get_negotiation(ctx, id)?
            .map(|n| to_json(&n))
            .transpose(),
        TradeQuery::Order(id) => keepers
            .orders
            .get_order(ctx, id)?
            .map(|o| to_json(&o))
            .transpose(),
        TradeQuery::Reputation(address) => keepers
            .reputation
            .find_reputation(ctx, address)?
            .map(|r| to_json(&r))
            .transpose(),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}
