//! Capability records for the delegated-authority hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, OrganizationId, ZoneId};

/// A single gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    IssueAsset,
    IssueFiat,
    SendAsset,
    SendFiat,
    BuyerExecuteOrder,
    SellerExecuteOrder,
    ChangeBuyerBid,
    ChangeSellerBid,
    ConfirmBuyerBid,
    ConfirmSellerBid,
    Negotiation,
    RedeemAsset,
    RedeemFiat,
    ReleaseAsset,
}

impl Capability {
    pub const ALL: [Self; 14] = [
        Self::IssueAsset,
        Self::IssueFiat,
        Self::SendAsset,
        Self::SendFiat,
        Self::BuyerExecuteOrder,
        Self::SellerExecuteOrder,
        Self::ChangeBuyerBid,
        Self::ChangeSellerBid,
        Self::ConfirmBuyerBid,
        Self::ConfirmSellerBid,
        Self::Negotiation,
        Self::RedeemAsset,
        Self::RedeemFiat,
        Self::ReleaseAsset,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IssueAsset => "issue_asset",
            Self::IssueFiat => "issue_fiat",
            Self::SendAsset => "send_asset",
            Self::SendFiat => "send_fiat",
            Self::BuyerExecuteOrder => "buyer_execute_order",
            Self::SellerExecuteOrder => "seller_execute_order",
            Self::ChangeBuyerBid => "change_buyer_bid",
            Self::ChangeSellerBid => "change_seller_bid",
            Self::ConfirmBuyerBid => "confirm_buyer_bid",
            Self::ConfirmSellerBid => "confirm_seller_bid",
            Self::Negotiation => "negotiation",
            Self::RedeemAsset => "redeem_asset",
            Self::RedeemFiat => "redeem_fiat",
            Self::ReleaseAsset => "release_asset",
        };
        f.write_str(s)
    }
}

/// Independent capability flags for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Acl {
    pub issue_asset: bool,
    pub issue_fiat: bool,
    pub send_asset: bool,
    pub send_fiat: bool,
    pub buyer_execute_order: bool,
    pub seller_execute_order: bool,
    pub change_buyer_bid: bool,
    pub change_seller_bid: bool,
    pub confirm_buyer_bid: bool,
    pub confirm_seller_bid: bool,
    pub negotiation: bool,
    pub redeem_asset: bool,
    pub redeem_fiat: bool,
    pub release_asset: bool,
}

impl Acl {
    /// Every capability granted.
    #[must_use]
    pub fn all() -> Self {
        Self::from_capabilities(Capability::ALL)
    }

    #[must_use]
    pub fn from_capabilities(caps: impl IntoIterator<Item = Capability>) -> Self {
        let mut acl = Self::default();
        for cap in caps {
            *acl.flag_mut(cap) = true;
        }
        acl
    }

    fn flag_mut(&mut self, cap: Capability) -> &mut bool {
        match cap {
            Capability::IssueAsset => &mut self.issue_asset,
            Capability::IssueFiat => &mut self.issue_fiat,
            Capability::SendAsset => &mut self.send_asset,
            Capability::SendFiat => &mut self.send_fiat,
            Capability::BuyerExecuteOrder => &mut self.buyer_execute_order,
            Capability::SellerExecuteOrder => &mut self.seller_execute_order,
            Capability::ChangeBuyerBid => &mut self.change_buyer_bid,
            Capability::ChangeSellerBid => &mut self.change_seller_bid,
            Capability::ConfirmBuyerBid => &mut self.confirm_buyer_bid,
            Capability::ConfirmSellerBid => &mut self.confirm_seller_bid,
            Capability::Negotiation => &mut self.negotiation,
            Capability::RedeemAsset => &mut self.redeem_asset,
            Capability::RedeemFiat => &mut self.redeem_fiat,
            Capability::ReleaseAsset => &mut self.release_asset,
        }
    }

    #[must_use]
    pub fn allows(&self, cap: Capability) -> bool {
        match cap {
            Capability::IssueAsset => self.issue_asset,
            Capability::IssueFiat => self.issue_fiat,
            Capability::SendAsset => self.send_asset,
            Capability::SendFiat => self.send_fiat,
            Capability::BuyerExecuteOrder => self.buyer_execute_order,
            Capability::SellerExecuteOrder => self.seller_execute_order,
            Capability::ChangeBuyerBid => self.change_buyer_bid,
            Capability::ChangeSellerBid => self.change_seller_bid,
            Capability::ConfirmBuyerBid => self.confirm_buyer_bid,
            Capability::ConfirmSellerBid => self.confirm_seller_bid,
            Capability::Negotiation => self.negotiation,
            Capability::RedeemAsset => self.redeem_asset,
            Capability::RedeemFiat => self.redeem_fiat,
            Capability::ReleaseAsset => self.release_asset,
        }
    }

    pub fn set(&mut self, cap: Capability, granted: bool) {
        *self.flag_mut(cap) = granted;
    }
}

/// Capability bundle registered for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclAccount {
    pub address: Address,
    pub zone_id: ZoneId,
    pub organization_id: OrganizationId,
    pub acl: Acl,
}

impl AclAccount {
    #[must_use]
    pub fn allows(&self, cap: Capability) -> bool {
        self.acl.allows(cap)
    }
}

/// An address a zone has authorized to manage accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub address: Address,
    pub zone_id: ZoneId,
}
