//! Negotiation state machine.
//!
//! A negotiation is created by the first bid change, mutated by further
//! changes while unsigned, and signed by each side independently. Once both
//! signatures are present it is terminal. See
//! [`pegsettle_types::negotiation`] for the state diagram.

use std::sync::Arc;

use ed25519_dalek::Verifier;
use serde::{Deserialize, Serialize};

use pegsettle_acl::AclKeeper;
use pegsettle_store::{Codec, Context};
use pegsettle_types::{
    keys, AccountDirectory, Address, Capability, Event, FeedbackCategory, LedgerConfig, Negotiation,
    NegotiationId, NegotiationStatus, Outcome, Party, PegHash, PegsettleError, Result, Signature,
};

use crate::reputation::ReputationKeeper;

/// Proposed terms for a bid change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidProposal {
    pub buyer: Address,
    pub seller: Address,
    pub peg_hash: PegHash,
    pub bid: i64,
    pub time: i64,
}

/// One side's signature over the stored terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidConfirmation {
    pub buyer: Address,
    pub seller: Address,
    pub peg_hash: PegHash,
    pub bid: i64,
    pub signature: Signature,
    #[serde(default)]
    pub contract_hash: String,
}

#[derive(Clone)]
pub struct NegotiationKeeper {
    codec: Arc<Codec>,
    acl: AclKeeper,
    reputation: ReputationKeeper,
    directory: Arc<dyn AccountDirectory>,
    enforce_taker_address: bool,
}

impl std::fmt::Debug for NegotiationKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NegotiationKeeper")
            .field("enforce_taker_address", &self.enforce_taker_address)
            .finish_non_exhaustive()
    }
}

impl NegotiationKeeper {
    #[must_use]
    pub fn new(
        codec: Arc<Codec>,
        acl: AclKeeper,
        reputation: ReputationKeeper,
        directory: Arc<dyn AccountDirectory>,
        cfg: &LedgerConfig,
    ) -> Self {
        Self {
            codec,
            acl,
            reputation,
            directory,
            enforce_taker_address: cfg.enforce_taker_address,
        }
    }

    pub fn get_negotiation(&self, ctx: &Context<'_>, id: &NegotiationId) -> Result<Option<Negotiation>> {
        ctx.load(&self.codec, &keys::negotiation_key(id))
    }

    /// Like [`get_negotiation`](Self::get_negotiation) but absent is an error.
    pub fn negotiation(&self, ctx: &Context<'_>, id: &NegotiationId) -> Result<Negotiation> {
        self.get_negotiation(ctx, id)?
            .ok_or_else(|| PegsettleError::NegotiationNotFound(id.clone()))
    }

    pub fn set_negotiation(&self, ctx: &mut Context<'_>, negotiation: &Negotiation) -> Result<()> {
        ctx.save(&self.codec, &keys::negotiation_key(&negotiation.negotiation_id), negotiation)
    }

    pub fn negotiations(&self, ctx: &Context<'_>) -> Result<Vec<Negotiation>> {
        Ok(ctx
            .load_all(&self.codec, &[keys::NEGOTIATION_PREFIX])?
            .into_iter()
            .map(|(_, n)| n)
            .collect())
    }

    // -----------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------

    fn authorize_change(&self, ctx: &Context<'_>, initiator: Party, buyer: &Address, seller: &Address) -> Result<()> {
        match initiator {
            Party::Buyer => self.acl.require(ctx, buyer, Capability::ChangeBuyerBid)?,
            Party::Seller => self.acl.require(ctx, seller, Capability::ChangeSellerBid)?,
        };
        self.acl.require(ctx, buyer, Capability::Negotiation)?;
        self.acl.require(ctx, seller, Capability::Negotiation)?;
        Ok(())
    }

    fn authorize_confirm(&self, ctx: &Context<'_>, buyer: &Address, seller: &Address) -> Result<()> {
        self.acl.require(ctx, buyer, Capability::ConfirmBuyerBid)?;
        self.acl.require(ctx, seller, Capability::ConfirmSellerBid)?;
        Ok(())
    }

    /// A peg the seller holds may be reserved for one taker.
    fn check_taker(&self, buyer: &Address, seller: &Address, peg_hash: &PegHash) -> Result<()> {
        if !self.enforce_taker_address {
            return Ok(());
        }
        let wallets = self.directory.account_wallets(seller)?;
        let reserved_for = wallets
            .asset_peg_wallet
            .get(peg_hash)
            .and_then(|peg| peg.taker_address.as_ref());
        match reserved_for {
            Some(taker) if taker != buyer => {
                tracing::warn!(peg = %peg_hash, buyer = %buyer, taker = %taker, "Peg reserved for another taker");
                Err(PegsettleError::TakerMismatch {
                    peg_hash: peg_hash.clone(),
                    buyer: buyer.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn verify_signature(&self, party: Party, signer: &Address, signature: &Signature, payload: &[u8]) -> Result<()> {
        let key = self.directory.resolve_public_key(signer)?;
        let sig = ed25519_dalek::Signature::from_slice(signature.as_bytes())
            .map_err(|_| PegsettleError::SignatureMalformed { party })?;
        key.verify(payload, &sig).map_err(|_| {
            tracing::warn!(party = %party, signer = %signer, "Negotiation signature rejected");
            PegsettleError::SignatureInvalid { party }
        })
    }

    // -----------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------

    /// Create or re-price an unsigned negotiation.
    pub fn change_bid(&self, ctx: &mut Context<'_>, initiator: Party, proposal: &BidProposal) -> Result<Negotiation> {
        let BidProposal {
            buyer,
            seller,
            peg_hash,
            bid,
            time,
        } = proposal;
        buyer.ensure_valid()?;
        seller.ensure_valid()?;
        self.authorize_change(ctx, initiator, buyer, seller)?;
        self.check_taker(buyer, seller, peg_hash)?;

        let id = NegotiationId::derive(buyer, seller, peg_hash);
        let negotiation = match self.get_negotiation(ctx, &id)? {
            None => Negotiation::proposed(buyer.clone(), seller.clone(), peg_hash.clone(), *bid, *time),
            Some(existing) if !existing.status().is_mutable() => {
                tracing::warn!(negotiation = %id, status = %existing.status(), "Bid change after signing");
                return Err(PegsettleError::AlreadySigned(id));
            }
            Some(mut existing) => {
                existing.bid = *bid;
                existing.time = *time;
                existing
            }
        };
        self.set_negotiation(ctx, &negotiation)?;

        let (kind, category, actor) = match initiator {
            Party::Buyer => ("change_buyer_bid", FeedbackCategory::ChangeBuyerBid, buyer),
            Party::Seller => ("change_seller_bid", FeedbackCategory::ChangeSellerBid, seller),
        };
        self.reputation.record(ctx, actor, category, Outcome::Positive)?;
        ctx.emit(transition_event(kind, &negotiation));
        tracing::info!(
            negotiation = %id,
            initiator = %initiator,
            bid = negotiation.bid,
            time = negotiation.time,
            height = ctx.block_height(),
            "Bid changed"
        );
        Ok(negotiation)
    }

    /// Attach `signer`'s signature to the stored terms.
    pub fn confirm_bid(
        &self,
        ctx: &mut Context<'_>,
        signer: Party,
        confirmation: &BidConfirmation,
    ) -> Result<Negotiation> {
        let BidConfirmation {
            buyer,
            seller,
            peg_hash,
            bid,
            signature,
            contract_hash,
        } = confirmation;
        self.authorize_confirm(ctx, buyer, seller)?;
        self.check_taker(buyer, seller, peg_hash)?;

        let id = NegotiationId::derive(buyer, seller, peg_hash);
        let mut negotiation = self.negotiation(ctx, &id)?;
        if negotiation.status() == NegotiationStatus::Confirmed {
            return Err(PegsettleError::SignaturesAlreadyExist(id));
        }
        if negotiation.bid != *bid {
            return Err(PegsettleError::BidMismatch {
                stored: negotiation.bid,
                submitted: *bid,
            });
        }

        let payload = negotiation.sign_body().signing_payload();
        self.verify_signature(signer, negotiation.address(signer), signature, &payload)?;
        negotiation.record_signature(signer, signature.clone(), ctx.block_height(), contract_hash.clone());
        self.set_negotiation(ctx, &negotiation)?;

        let (kind, category) = match signer {
            Party::Buyer => ("confirm_buyer_bid", FeedbackCategory::ConfirmBuyerBid),
            Party::Seller => ("confirm_seller_bid", FeedbackCategory::ConfirmSellerBid),
        };
        self.reputation
            .record(ctx, negotiation.address(signer), category, Outcome::Positive)?;
        if negotiation.is_confirmed() {
            for party in [Party::Buyer, Party::Seller] {
                self.reputation.record(
                    ctx,
                    negotiation.address(party),
                    FeedbackCategory::Negotiation,
                    Outcome::Positive,
                )?;
            }
        }
        ctx.emit(transition_event(kind, &negotiation));
        tracing::info!(
            negotiation = %id,
            signer = %signer,
            status = %negotiation.status(),
            height = ctx.block_height(),
            "Bid confirmed"
        );
        Ok(negotiation)
    }

    /// The confirmed, unexpired negotiation for a trade.
    pub fn confirmed_negotiation(&self, ctx: &Context<'_>, id: &NegotiationId) -> Result<Negotiation> {
        let negotiation = self.negotiation(ctx, id)?;
        if !negotiation.is_confirmed() {
            return Err(PegsettleError::NegotiationNotConfirmed(id.clone()));
        }
        if negotiation.is_expired(ctx.block_height()) {
            return Err(PegsettleError::NegotiationExpired {
                id: id.clone(),
                expired_at: negotiation.expires_at(),
            });
        }
        Ok(negotiation)
    }
}

fn transition_event(kind: &str, negotiation: &Negotiation) -> Event {
    Event::new(kind)
        .attr("negotiation_id", &negotiation.negotiation_id)
        .attr("buyer", &negotiation.buyer_address)
        .attr("seller", &negotiation.seller_address)
        .attr("peg_hash", &negotiation.peg_hash)
}
