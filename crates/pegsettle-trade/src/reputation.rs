//! Reputation feedback ledger.
//!
//! Two kinds of data per address:
//! - action counters, bumped by the owning keeper when an action succeeds
//! - trader feedback, one entry per (rater, ratee, peg) once the trade's
//!   escrow order carries both completion proofs
//!
//! The aggregate rating is the mean of all received scores.

use std::sync::Arc;

use pegsettle_acl::AclKeeper;
use pegsettle_store::{Codec, Context};
use pegsettle_types::{
    keys, AccountReputation, Address, Capability, Event, FeedbackCategory, LedgerConfig,
    NegotiationId, Outcome, Party, PegHash, PegsettleError, Result, TraderFeedback,
};

use crate::escrow::OrderKeeper;

#[derive(Debug, Clone)]
pub struct ReputationKeeper {
    codec: Arc<Codec>,
    acl: AclKeeper,
    orders: OrderKeeper,
    min_score: i64,
    max_score: i64,
}

impl ReputationKeeper {
    #[must_use]
    pub fn new(codec: Arc<Codec>, acl: AclKeeper, orders: OrderKeeper, cfg: &LedgerConfig) -> Self {
        Self {
            codec,
            acl,
            orders,
            min_score: cfg.min_feedback_score,
            max_score: cfg.max_feedback_score,
        }
    }

    /// Stored record only.
    pub fn find_reputation(&self, ctx: &Context<'_>, address: &Address) -> Result<Option<AccountReputation>> {
        ctx.load(&self.codec, &keys::reputation_key(address))
    }

    /// Stored record, or a fresh one if the address has none yet.
    pub fn get_reputation(&self, ctx: &Context<'_>, address: &Address) -> Result<AccountReputation> {
        Ok(self
            .find_reputation(ctx, address)?
            .unwrap_or_else(|| AccountReputation::new(address.clone())))
    }

    pub fn set_reputation(&self, ctx: &mut Context<'_>, reputation: &AccountReputation) -> Result<()> {
        ctx.save(&self.codec, &keys::reputation_key(&reputation.address), reputation)
    }

    pub fn reputations(&self, ctx: &Context<'_>) -> Result<Vec<AccountReputation>> {
        Ok(ctx
            .load_all(&self.codec, &[keys::REPUTATION_PREFIX])?
            .into_iter()
            .map(|(_, rep)| rep)
            .collect())
    }

    /// Bump one action counter.
    pub fn record(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        category: FeedbackCategory,
        outcome: Outcome,
    ) -> Result<()> {
        let mut rep = self.get_reputation(ctx, address)?;
        rep.transaction_feedback.record(category, outcome);
        self.set_reputation(ctx, &rep)?;
        tracing::debug!(address = %address, category = %category, ?outcome, "Reputation counter bumped");
        Ok(())
    }

    /// Record feedback from `rater_role` about its counterparty.
    ///
    /// The buyer rates the seller and vice versa. The rater must hold the
    /// execute capability for its role.
    pub fn submit_feedback(
        &self,
        ctx: &mut Context<'_>,
        rater_role: Party,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
        score: i64,
    ) -> Result<AccountReputation> {
        if score < self.min_score || score > self.max_score {
            return Err(PegsettleError::ScoreOutOfRange {
                score,
                min: self.min_score,
                max: self.max_score,
            });
        }
        let (rater, ratee, capability) = match rater_role {
            Party::Buyer => (buyer, seller, Capability::BuyerExecuteOrder),
            Party::Seller => (seller, buyer, Capability::SellerExecuteOrder),
        };
        self.acl.require(ctx, rater, capability)?;

        let id = NegotiationId::derive(buyer, seller, peg_hash);
        let completed = self
            .orders
            .get_order(ctx, &id)?
            .is_some_and(|order| order.is_executed());
        if !completed {
            tracing::warn!(order = %id, rater = %rater, "Feedback before trade completion");
            return Err(PegsettleError::TransactionNotCompleted(id));
        }

        let mut rep = self.get_reputation(ctx, ratee)?;
        if rep.has_feedback_from(rater, peg_hash) {
            return Err(PegsettleError::DuplicateFeedback {
                rater: rater.clone(),
                peg_hash: peg_hash.clone(),
            });
        }
        rep.append_feedback(TraderFeedback {
            rater: rater.clone(),
            ratee: ratee.clone(),
            peg_hash: peg_hash.clone(),
            score,
        });
        self.set_reputation(ctx, &rep)?;

        let kind = match rater_role {
            Party::Buyer => "buyer_feedback",
            Party::Seller => "seller_feedback",
        };
        ctx.emit(
            Event::new(kind)
                .attr("from", rater)
                .attr("to", ratee)
                .attr("peg_hash", peg_hash)
                .attr("rating", score),
        );
        tracing::info!(rater = %rater, ratee = %ratee, score, rating = %rep.rating, "Trader feedback recorded");
        Ok(rep)
    }
}
