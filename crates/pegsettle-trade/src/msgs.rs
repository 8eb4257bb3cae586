//! Inbound trade messages. Every message carries one or more entries.

use serde::{Deserialize, Serialize};

use pegsettle_types::{
    Address, AssetPeg, FiatPegWallet, LedgerConfig, Party, PegHash, PegsettleError, Result,
};

use crate::negotiation::{BidConfirmation, BidProposal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAsset {
    pub seller: Address,
    pub buyer: Address,
    pub asset_peg: AssetPeg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFiat {
    pub buyer: Address,
    pub seller: Address,
    /// The asset peg being paid for.
    pub peg_hash: PegHash,
    pub fiat_peg_wallet: FiatPegWallet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOrder {
    pub buyer: Address,
    pub seller: Address,
    pub peg_hash: PegHash,
    pub proof_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub buyer: Address,
    pub seller: Address,
    pub peg_hash: PegHash,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entries", rename_all = "snake_case")]
pub enum TradeMsg {
    ChangeBuyerBids(Vec<BidProposal>),
    ChangeSellerBids(Vec<BidProposal>),
    ConfirmBuyerBids(Vec<BidConfirmation>),
    ConfirmSellerBids(Vec<BidConfirmation>),
    SendAssetsToOrder(Vec<SendAsset>),
    SendFiatsToOrder(Vec<SendFiat>),
    BuyerExecuteOrders(Vec<ExecuteOrder>),
    SellerExecuteOrders(Vec<ExecuteOrder>),
    BuyerFeedbacks(Vec<Feedback>),
    SellerFeedbacks(Vec<Feedback>),
}

fn check_parties(buyer: &Address, seller: &Address, peg_hash: &PegHash) -> Result<()> {
    buyer.ensure_valid()?;
    seller.ensure_valid()?;
    peg_hash.ensure_present()?;
    if buyer == seller {
        return Err(PegsettleError::InvalidInput {
            field: "seller",
            reason: "buyer and seller must differ".into(),
        });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(PegsettleError::InvalidInput {
            field,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

impl TradeMsg {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::ChangeBuyerBids(e) | Self::ChangeSellerBids(e) => e.len(),
            Self::ConfirmBuyerBids(e) | Self::ConfirmSellerBids(e) => e.len(),
            Self::SendAssetsToOrder(e) => e.len(),
            Self::SendFiatsToOrder(e) => e.len(),
            Self::BuyerExecuteOrders(e) | Self::SellerExecuteOrders(e) => e.len(),
            Self::BuyerFeedbacks(e) | Self::SellerFeedbacks(e) => e.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stateless checks run before any store access.
    pub fn validate_basic(&self, cfg: &LedgerConfig) -> Result<()> {
        cfg.check_batch_len(self.len())?;
        match self {
            Self::ChangeBuyerBids(entries) | Self::ChangeSellerBids(entries) => {
                for e in entries {
                    check_parties(&e.buyer, &e.seller, &e.peg_hash)?;
                    check_non_negative("bid", e.bid)?;
                    check_non_negative("time", e.time)?;
                }
            }
            Self::ConfirmBuyerBids(entries) | Self::ConfirmSellerBids(entries) => {
                for e in entries {
                    check_parties(&e.buyer, &e.seller, &e.peg_hash)?;
                    check_non_negative("bid", e.bid)?;
                    if e.signature.as_bytes().is_empty() {
                        return Err(PegsettleError::InvalidInput {
                            field: "signature",
                            reason: "must not be empty".into(),
                        });
                    }
                }
            }
            Self::SendAssetsToOrder(entries) => {
                for e in entries {
                    check_parties(&e.buyer, &e.seller, &e.asset_peg.peg_hash)?;
                    e.asset_peg.validate()?;
                }
            }
            Self::SendFiatsToOrder(entries) => {
                for e in entries {
                    check_parties(&e.buyer, &e.seller, &e.peg_hash)?;
                    if e.fiat_peg_wallet.is_empty() {
                        return Err(PegsettleError::InvalidInput {
                            field: "fiat_peg_wallet",
                            reason: "must carry at least one fiat peg".into(),
                        });
                    }
                    e.fiat_peg_wallet.validate_amounts()?;
                }
            }
            Self::BuyerExecuteOrders(entries) | Self::SellerExecuteOrders(entries) => {
                for e in entries {
                    check_parties(&e.buyer, &e.seller, &e.peg_hash)?;
                    if e.proof_hash.is_empty() {
                        return Err(PegsettleError::InvalidInput {
                            field: "proof_hash",
                            reason: "must not be empty".into(),
                        });
                    }
                }
            }
            Self::BuyerFeedbacks(entries) | Self::SellerFeedbacks(entries) => {
                for e in entries {
                    check_parties(&e.buyer, &e.seller, &e.peg_hash)?;
                    cfg.check_score(e.score)?;
                }
            }
        }
        Ok(())
    }

    /// Which side signs this message.
    #[must_use]
    pub fn signing_party(&self) -> Party {
        match self {
            Self::ChangeBuyerBids(_)
            | Self::ConfirmBuyerBids(_)
            | Self::SendFiatsToOrder(_)
            | Self::BuyerExecuteOrders(_)
            | Self::BuyerFeedbacks(_) => Party::Buyer,
            Self::ChangeSellerBids(_)
            | Self::ConfirmSellerBids(_)
            | Self::SendAssetsToOrder(_)
            | Self::SellerExecuteOrders(_)
            | Self::SellerFeedbacks(_) => Party::Seller,
        }
    }

    /// The signing side's address of every entry, in entry order.
    #[must_use]
    pub fn signers(&self) -> Vec<Address> {
        let pick = |buyer: &Address, seller: &Address| match self.signing_party() {
            Party::Buyer => buyer.clone(),
            Party::Seller => seller.clone(),
        };
        match self {
            Self::ChangeBuyerBids(e) | Self::ChangeSellerBids(e) => {
                e.iter().map(|x| pick(&x.buyer, &x.seller)).collect()
            }
            Self::ConfirmBuyerBids(e) | Self::ConfirmSellerBids(e) => {
                e.iter().map(|x| pick(&x.buyer, &x.seller)).collect()
            }
            Self::SendAssetsToOrder(e) => e.iter().map(|x| pick(&x.buyer, &x.seller)).collect(),
            Self::SendFiatsToOrder(e) => e.iter().map(|x| pick(&x.buyer, &x.seller)).collect(),
            Self::BuyerExecuteOrders(e) | Self::SellerExecuteOrders(e) => {
                e.iter().map(|x| pick(&x.buyer, &x.seller)).collect()
            }
            Self::BuyerFeedbacks(e) | Self::SellerFeedbacks(e) => {
                e.iter().map(|x| pick(&x.buyer, &x.seller)).collect()
            }
        }
    }
}
