//! Per-account reputation: action counters plus counterparty feedback.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::RATING_DECIMAL_PLACES;
use crate::{Address, PegHash, PegsettleError, Result};

/// Action class a counter is kept for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    SendAsset,
    SendFiat,
    IbcIssueAsset,
    IbcIssueFiat,
    BuyerExecuteOrder,
    SellerExecuteOrder,
    ChangeBuyerBid,
    ChangeSellerBid,
    ConfirmBuyerBid,
    ConfirmSellerBid,
    Negotiation,
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SendAsset => "send_asset",
            Self::SendFiat => "send_fiat",
            Self::IbcIssueAsset => "ibc_issue_asset",
            Self::IbcIssueFiat => "ibc_issue_fiat",
            Self::BuyerExecuteOrder => "buyer_execute_order",
            Self::SellerExecuteOrder => "seller_execute_order",
            Self::ChangeBuyerBid => "change_buyer_bid",
            Self::ChangeSellerBid => "change_seller_bid",
            Self::ConfirmBuyerBid => "confirm_buyer_bid",
            Self::ConfirmSellerBid => "confirm_seller_bid",
            Self::Negotiation => "negotiation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxCounter {
    pub positive: u64,
    pub negative: u64,
}

impl TxCounter {
    fn bump(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Positive => &mut self.positive,
            Outcome::Negative => &mut self.negative,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Positive/negative counters per [`FeedbackCategory`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionFeedback {
    pub send_asset: TxCounter,
    pub send_fiat: TxCounter,
    pub ibc_issue_asset: TxCounter,
    pub ibc_issue_fiat: TxCounter,
    pub buyer_execute_order: TxCounter,
    pub seller_execute_order: TxCounter,
    pub change_buyer_bid: TxCounter,
    pub change_seller_bid: TxCounter,
    pub confirm_buyer_bid: TxCounter,
    pub confirm_seller_bid: TxCounter,
    pub negotiation: TxCounter,
}

impl TransactionFeedback {
    #[must_use]
    pub fn counter(&self, category: FeedbackCategory) -> TxCounter {
        match category {
            FeedbackCategory::SendAsset => self.send_asset,
            FeedbackCategory::SendFiat => self.send_fiat,
            FeedbackCategory::IbcIssueAsset => self.ibc_issue_asset,
            FeedbackCategory::IbcIssueFiat => self.ibc_issue_fiat,
            FeedbackCategory::BuyerExecuteOrder => self.buyer_execute_order,
            FeedbackCategory::SellerExecuteOrder => self.seller_execute_order,
            FeedbackCategory::ChangeBuyerBid => self.change_buyer_bid,
            FeedbackCategory::ChangeSellerBid => self.change_seller_bid,
            FeedbackCategory::ConfirmBuyerBid => self.confirm_buyer_bid,
            FeedbackCategory::ConfirmSellerBid => self.confirm_seller_bid,
            FeedbackCategory::Negotiation => self.negotiation,
        }
    }

    pub fn record(&mut self, category: FeedbackCategory, outcome: Outcome) {
        let counter = match category {
            FeedbackCategory::SendAsset => &mut self.send_asset,
            FeedbackCategory::SendFiat => &mut self.send_fiat,
            FeedbackCategory::IbcIssueAsset => &mut self.ibc_issue_asset,
            FeedbackCategory::IbcIssueFiat => &mut self.ibc_issue_fiat,
            FeedbackCategory::BuyerExecuteOrder => &mut self.buyer_execute_order,
            FeedbackCategory::SellerExecuteOrder => &mut self.seller_execute_order,
            FeedbackCategory::ChangeBuyerBid => &mut self.change_buyer_bid,
            FeedbackCategory::ChangeSellerBid => &mut self.change_seller_bid,
            FeedbackCategory::ConfirmBuyerBid => &mut self.confirm_buyer_bid,
            FeedbackCategory::ConfirmSellerBid => &mut self.confirm_seller_bid,
            FeedbackCategory::Negotiation => &mut self.negotiation,
        };
        counter.bump(outcome);
    }
}

/// One rating given by a counterparty after a completed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderFeedback {
    pub rater: Address,
    pub ratee: Address,
    pub peg_hash: PegHash,
    pub score: i64,
}

/// Reputation record for one address. Created lazily on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReputation {
    pub address: Address,
    pub transaction_feedback: TransactionFeedback,
    pub trader_feedback_history: Vec<TraderFeedback>,
    /// Mean of all received scores.
    pub rating: Decimal,
}

impl AccountReputation {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            transaction_feedback: TransactionFeedback::default(),
            trader_feedback_history: Vec::new(),
            rating: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn has_feedback_from(&self, rater: &Address, peg_hash: &PegHash) -> bool {
        self.trader_feedback_history
            .iter()
            .any(|f| &f.rater == rater && &f.peg_hash == peg_hash && f.ratee == self.address)
    }

    /// Append a feedback entry and fold its score into the rating.
    ///
    /// Callers must have checked for duplicates.
    pub fn append_feedback(&mut self, feedback: TraderFeedback) {
        self.trader_feedback_history.push(feedback);
        self.rating = mean_rating(&self.trader_feedback_history);
    }

    /// Consistency of an imported record: every entry rates this address,
    /// no rater rates the same peg twice, and the rating is the history's mean.
    pub fn validate(&self) -> Result<()> {
        self.address.ensure_valid()?;
        for (i, feedback) in self.trader_feedback_history.iter().enumerate() {
            if feedback.ratee != self.address {
                return Err(PegsettleError::InvalidInput {
                    field: "trader_feedback_history",
                    reason: format!("entry rates {}, not {}", feedback.ratee, self.address),
                });
            }
            let repeated = self.trader_feedback_history[..i]
                .iter()
                .any(|f| f.rater == feedback.rater && f.peg_hash == feedback.peg_hash);
            if repeated {
                return Err(PegsettleError::DuplicateFeedback {
                    rater: feedback.rater.clone(),
                    peg_hash: feedback.peg_hash.clone(),
                });
            }
        }
        let expected = mean_rating(&self.trader_feedback_history);
        if self.rating != expected {
            return Err(PegsettleError::InvalidInput {
                field: "rating",
                reason: format!("{} does not match feedback mean {expected}", self.rating),
            });
        }
        Ok(())
    }
}

fn mean_rating(history: &[TraderFeedback]) -> Decimal {
    if history.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = history.iter().map(|f| Decimal::from(f.score)).sum();
    (sum / Decimal::from(history.len())).round_dp(RATING_DECIMAL_PLACES)
}
