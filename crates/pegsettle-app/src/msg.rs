//! Top-level message and query envelopes.

use serde::{Deserialize, Serialize};

use pegsettle_acl::{AclMsg, AclQuery};
use pegsettle_trade::{TradeMsg, TradeQuery};
use pegsettle_types::{Address, LedgerConfig, NegotiationId, OrganizationId, Result, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "module", content = "msg", rename_all = "snake_case")]
pub enum Msg {
    Acl(AclMsg),
    Trade(TradeMsg),
}

impl Msg {
    pub fn validate_basic(&self, cfg: &LedgerConfig) -> Result<()> {
        match self {
            Self::Acl(m) => m.validate_basic(cfg),
            Self::Trade(m) => m.validate_basic(cfg),
        }
    }

    /// Addresses that must have signed the enclosing transaction.
    #[must_use]
    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::Acl(m) => m.signers(),
            Self::Trade(m) => m.signers(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Acl(AclMsg::DefineZones(_)) => "define_zones",
            Self::Acl(AclMsg::DefineOrganizations(_)) => "define_organizations",
            Self::Acl(AclMsg::DefineAcls(_)) => "define_acls",
            Self::Trade(TradeMsg::ChangeBuyerBids(_)) => "change_buyer_bids",
            Self::Trade(TradeMsg::ChangeSellerBids(_)) => "change_seller_bids",
            Self::Trade(TradeMsg::ConfirmBuyerBids(_)) => "confirm_buyer_bids",
            Self::Trade(TradeMsg::ConfirmSellerBids(_)) => "confirm_seller_bids",
            Self::Trade(TradeMsg::SendAssetsToOrder(_)) => "send_assets_to_order",
            Self::Trade(TradeMsg::SendFiatsToOrder(_)) => "send_fiats_to_order",
            Self::Trade(TradeMsg::BuyerExecuteOrders(_)) => "buyer_execute_orders",
            Self::Trade(TradeMsg::SellerExecuteOrders(_)) => "seller_execute_orders",
            Self::Trade(TradeMsg::BuyerFeedbacks(_)) => "buyer_feedbacks",
            Self::Trade(TradeMsg::SellerFeedbacks(_)) => "seller_feedbacks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", content = "id", rename_all = "snake_case")]
pub enum Query {
    Negotiation(NegotiationId),
    Order(NegotiationId),
    Reputation(Address),
    AclAccount(Address),
    Zone(ZoneId),
    Organization(OrganizationId),
}

pub(crate) enum Route {
    Acl(AclQuery),
    Trade(TradeQuery),
}

impl Query {
    pub(crate) fn route(&self) -> Route {
        match self {
            Self::Negotiation(id) => Route::Trade(TradeQuery::Negotiation(id.clone())),
            Self::Order(id) => Route::Trade(TradeQuery::Order(id.clone())),
            Self::Reputation(a) => Route::Trade(TradeQuery::Reputation(a.clone())),
            Self::AclAccount(a) => Route::Acl(AclQuery::AclAccount(a.clone())),
            Self::Zone(id) => Route::Acl(AclQuery::Zone(id.clone())),
            Self::Organization(id) => Route::Acl(AclQuery::Organization(id.clone())),
        }
    }
}
