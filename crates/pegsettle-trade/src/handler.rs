//! Routes trade messages to the keepers.
//!
//! Custody and execution messages span keepers, so the cross-keeper rules
//! live here: credits require a confirmed, unexpired negotiation, and the
//! sender's reputation counter is bumped after each successful action.

use pegsettle_store::{run_batch, Context};
use pegsettle_types::{
    Event, FeedbackCategory, LedgerConfig, NegotiationId, Order, Outcome, Party, Result,
};

use crate::msgs::{ExecuteOrder, TradeMsg};
use crate::TradeKeepers;

pub fn handle_trade_msg(
    keepers: &TradeKeepers,
    ctx: &mut Context<'_>,
    cfg: &LedgerConfig,
    msg: &TradeMsg,
) -> Result<()> {
    msg.validate_basic(cfg)?;
    let mode = cfg.batch_mode;
    match msg {
        TradeMsg::ChangeBuyerBids(entries) => run_batch(ctx, mode, entries, |c, e| {
            keepers.negotiation.change_bid(c, Party::Buyer, e).map(drop)
        }),
        TradeMsg::ChangeSellerBids(entries) => run_batch(ctx, mode, entries, |c, e| {
            keepers.negotiation.change_bid(c, Party::Seller, e).map(drop)
        }),
        TradeMsg::ConfirmBuyerBids(entries) => run_batch(ctx, mode, entries, |c, e| {
            keepers.negotiation.confirm_bid(c, Party::Buyer, e).map(drop)
        }),
        TradeMsg::ConfirmSellerBids(entries) => run_batch(ctx, mode, entries, |c, e| {
            keepers.negotiation.confirm_bid(c, Party::Seller, e).map(drop)
        }),
        TradeMsg::SendAssetsToOrder(entries) => run_batch(ctx, mode, entries, |c, e| {
            let id = NegotiationId::derive(&e.buyer, &e.seller, &e.asset_peg.peg_hash);
            keepers.negotiation.confirmed_negotiation(c, &id)?;
            keepers.orders.credit_asset(c, &e.seller, &e.buyer, &e.asset_peg)?;
            keepers
                .reputation
                .record(c, &e.seller, FeedbackCategory::SendAsset, Outcome::Positive)
        }),
        TradeMsg::SendFiatsToOrder(entries) => run_batch(ctx, mode, entries, |c, e| {
            let id = NegotiationId::derive(&e.buyer, &e.seller, &e.peg_hash);
            keepers.negotiation.confirmed_negotiation(c, &id)?;
            keepers
                .orders
                .credit_fiat(c, &e.buyer, &e.seller, &e.peg_hash, &e.fiat_peg_wallet)?;
            keepers
                .reputation
                .record(c, &e.buyer, FeedbackCategory::SendFiat, Outcome::Positive)
        }),
        TradeMsg::BuyerExecuteOrders(entries) => run_batch(ctx, mode, entries, |c, e| {
            let order = keepers
                .orders
                .set_fiat_proof_hash(c, &e.buyer, &e.seller, &e.peg_hash, &e.proof_hash)?;
            finish_execution(keepers, c, Party::Buyer, e, &order)
        }),
        TradeMsg::SellerExecuteOrders(entries) => run_batch(ctx, mode, entries, |c, e| {
            let order = keepers
                .orders
                .set_awb_proof_hash(c, &e.buyer, &e.seller, &e.peg_hash, &e.proof_hash)?;
            finish_execution(keepers, c, Party::Seller, e, &order)
        }),
        TradeMsg::BuyerFeedbacks(entries) => run_batch(ctx, mode, entries, |c, e| {
            keepers
                .reputation
                .submit_feedback(c, Party::Buyer, &e.buyer, &e.seller, &e.peg_hash, e.score)
                .map(drop)
        }),
        TradeMsg::SellerFeedbacks(entries) => run_batch(ctx, mode, entries, |c, e| {
            keepers
                .reputation
                .submit_feedback(c, Party::Seller, &e.buyer, &e.seller, &e.peg_hash, e.score)
                .map(drop)
        }),
    }
}

/// Emit the execution event. Once both proofs are in, credit both sides'
/// execute counters.
fn finish_execution(
    keepers: &TradeKeepers,
    ctx: &mut Context<'_>,
    executor: Party,
    entry: &ExecuteOrder,
    order: &Order,
) -> Result<()> {
    let kind = match executor {
        Party::Buyer => "buyer_execute_order",
        Party::Seller => "seller_execute_order",
    };
    ctx.emit(
        Event::new(kind)
            .attr("negotiation_id", &order.negotiation_id)
            .attr("buyer", &entry.buyer)
            .attr("seller", &entry.seller)
            .attr("peg_hash", &entry.peg_hash)
            .attr("executed", order.is_executed()),
    );
    if order.is_executed() {
        keepers
            .reputation
            .record(ctx, &entry.buyer, FeedbackCategory::BuyerExecuteOrder, Outcome::Positive)?;
        keepers
            .reputation
            .record(ctx, &entry.seller, FeedbackCategory::SellerExecuteOrder, Outcome::Positive)?;
        tracing::info!(order = %order.negotiation_id, "Order executed");
    }
    Ok(())
}
