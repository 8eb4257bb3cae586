//! Escrow order: ledger-held custody for one negotiated trade.

use serde::{Deserialize, Serialize};

use crate::{AssetPegWallet, FiatPegWallet, NegotiationId, Result};

/// Custody record keyed by the trade's [`NegotiationId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub negotiation_id: NegotiationId,
    pub asset_peg_wallet: AssetPegWallet,
    pub fiat_peg_wallet: FiatPegWallet,
    /// Off-chain proof of the fiat transfer. Empty until the buyer executes.
    pub fiat_proof_hash: String,
    /// Off-chain proof of shipment (air waybill). Empty until the seller executes.
    pub awb_proof_hash: String,
}

impl Order {
    #[must_use]
    pub fn new(negotiation_id: NegotiationId) -> Self {
        Self {
            negotiation_id,
            asset_peg_wallet: AssetPegWallet::new(),
            fiat_peg_wallet: FiatPegWallet::new(),
            fiat_proof_hash: String::new(),
            awb_proof_hash: String::new(),
        }
    }

    /// Both completion proofs are recorded.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        !self.fiat_proof_hash.is_empty() && !self.awb_proof_hash.is_empty()
    }

    /// Wallet contents checked the same way inbound transfers are.
    pub fn validate(&self) -> Result<()> {
        self.asset_peg_wallet.validate()?;
        self.fiat_peg_wallet.validate_amounts()
    }
}

/// Read-only view returned by order lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub asset_peg_wallet: AssetPegWallet,
    pub fiat_peg_wallet: FiatPegWallet,
    pub fiat_proof_hash: String,
    pub awb_proof_hash: String,
}

impl From<Order> for OrderDetails {
    fn from(order: Order) -> Self {
        Self {
            asset_peg_wallet: order.asset_peg_wallet,
            fiat_peg_wallet: order.fiat_peg_wallet,
            fiat_proof_hash: order.fiat_proof_hash,
            awb_proof_hash: order.awb_proof_hash,
        }
    }
}
