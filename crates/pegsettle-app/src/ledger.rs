//! The ledger facade.
//!
//! A [`Ledger`] owns no storage. The runtime hands it a store handle and
//! block header per committed message; the ledger routes the message,
//! applies the configured batch mode, and returns the emitted events.

use std::sync::Arc;

use pegsettle_acl::{handle_acl_msg, query_acl, AclKeeper};
use pegsettle_store::{CacheStore, Codec, Context, KvStore};
use pegsettle_trade::{handle_trade_msg, query_trade, TradeKeepers};
use pegsettle_types::{
    AccountDirectory, Address, AssetPeg, BlockHeader, Event, FiatPegWallet, LedgerConfig,
    NegotiationId, PegHash, PegsettleError, Result,
};

use crate::digest::state_digest;
use crate::genesis::GenesisState;
use crate::msg::{Msg, Query, Route};

/// Custody released out of an executed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Handed to the buyer.
    pub asset_peg: AssetPeg,
    /// Handed to the seller.
    pub fiat_peg_wallet: FiatPegWallet,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    cfg: LedgerConfig,
    acl: AclKeeper,
    trade: TradeKeepers,
}

impl Ledger {
    pub fn new(cfg: LedgerConfig, directory: Arc<dyn AccountDirectory>) -> Result<Self> {
        cfg.validate()?;
        let codec = Arc::new(Codec::new(cfg.max_record_bytes));
        let acl = AclKeeper::new(codec.clone());
        let trade = TradeKeepers::new(codec, acl.clone(), directory, &cfg);
        tracing::info!(
            batch_mode = ?cfg.batch_mode,
            max_batch_entries = cfg.max_batch_entries,
            enforce_taker_address = cfg.enforce_taker_address,
            "Ledger initialised"
        );
        Ok(Self { cfg, acl, trade })
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.cfg
    }

    #[must_use]
    pub fn acl(&self) -> &AclKeeper {
        &self.acl
    }

    #[must_use]
    pub fn trade(&self) -> &TradeKeepers {
        &self.trade
    }

    /// Execute one committed message.
    pub fn deliver(&self, store: &mut dyn KvStore, header: BlockHeader, msg: &Msg) -> Result<Vec<Event>> {
        let span = tracing::info_span!("deliver", msg = msg.kind(), height = header.height);
        let _guard = span.enter();

        let mut ctx = Context::new(store, header);
        let outcome = match msg {
            Msg::Acl(m) => handle_acl_msg(&self.acl, &mut ctx, &self.cfg, m),
            Msg::Trade(m) => handle_trade_msg(&self.trade, &mut ctx, &self.cfg, m),
        };
        match outcome {
            Ok(()) => {
                let events = ctx.take_events();
                tracing::debug!(events = events.len(), "Message applied");
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = %err.kind(), "Message rejected");
                Err(err)
            }
        }
    }

    /// Point lookup returning pretty JSON, or `None` when absent.
    pub fn query(&self, store: &dyn KvStore, query: &Query) -> Result<Option<Vec<u8>>> {
        let mut view = CacheStore::new(store);
        // Queries never read the header.
        let ctx = Context::new(&mut view, BlockHeader::at_height(0));
        match query.route() {
            Route::Acl(q) => query_acl(&self.acl, &ctx, &q),
            Route::Trade(q) => query_trade(&self.trade, &ctx, &q),
        }
    }

    /// Release an executed order: the asset peg goes to the buyer and the
    /// whole fiat wallet to the seller. The order record stays, drained.
    pub fn settle(
        &self,
        store: &mut dyn KvStore,
        header: BlockHeader,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
    ) -> Result<Settlement> {
        let mut ctx = Context::new(store, header);
        let (asset_peg, fiat_peg_wallet) = ctx.atomic(|c| {
            let id = NegotiationId::derive(buyer, seller, peg_hash);
            let order = self
                .trade
                .orders
                .get_order(c, &id)?
                .ok_or_else(|| PegsettleError::OrderNotFound(id.clone()))?;
            if !order.is_executed() {
                return Err(PegsettleError::TransactionNotCompleted(id));
            }
            let asset_peg = order
                .asset_peg_wallet
                .get(peg_hash)
                .cloned()
                .ok_or_else(|| PegsettleError::PegNotFound(peg_hash.clone()))?;
            self.trade.orders.debit_asset(c, buyer, seller, peg_hash)?;
            let fiat = order.fiat_peg_wallet;
            let amount = fiat.balance()?;
            if !fiat.is_empty() {
                self.trade.orders.debit_fiat(c, buyer, seller, peg_hash, &fiat)?;
            }
            c.emit(
                Event::new("settle_order")
                    .attr("negotiation_id", &id)
                    .attr("buyer", buyer)
                    .attr("seller", seller)
                    .attr("peg_hash", peg_hash)
                    .attr("amount", amount),
            );
            Ok((asset_peg, fiat))
        })?;
        tracing::info!(buyer = %buyer, seller = %seller, peg = %peg_hash, "Order settled");
        Ok(Settlement {
            asset_peg,
            fiat_peg_wallet,
            events: ctx.take_events(),
        })
    }

    /// Load a genesis document. Nothing is written unless every record loads.
    pub fn init_genesis(&self, store: &mut dyn KvStore, genesis: &GenesisState) -> Result<()> {
        genesis.validate()?;
        let mut ctx = Context::new(store, BlockHeader::at_height(0));
        ctx.atomic(|c| {
            pegsettle_acl::init_genesis(&self.acl, c, &genesis.acl)?;
            pegsettle_trade::init_genesis(&self.trade, c, &genesis.trade)
        })
    }

    pub fn export_genesis(&self, store: &dyn KvStore) -> Result<GenesisState> {
        let mut view = CacheStore::new(store);
        let ctx = Context::new(&mut view, BlockHeader::at_height(0));
        Ok(GenesisState {
            acl: pegsettle_acl::export_genesis(&self.acl, &ctx)?,
            trade: pegsettle_trade::export_genesis(&self.trade, &ctx)?,
        })
    }

    #[must_use]
    pub fn state_digest(&self, store: &dyn KvStore) -> String {
        state_digest(store)
    }
}
