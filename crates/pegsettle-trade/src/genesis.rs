//! Trade genesis import / export.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use pegsettle_store::Context;
use pegsettle_types::{AccountReputation, Negotiation, NegotiationId, Order, PegsettleError, Result};

use crate::TradeKeepers;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeGenesis {
    pub negotiations: Vec<Negotiation>,
    pub orders: Vec<Order>,
    pub reputations: Vec<AccountReputation>,
}

impl TradeGenesis {
    /// Record ids must match their contents, appear once, and every order
    /// must belong to a negotiation listed here. Wallets and reputations get
    /// the same checks live messages do.
    pub fn validate(&self) -> Result<()> {
        let mut negotiation_ids = HashSet::new();
        for n in &self.negotiations {
            let expected = NegotiationId::derive(&n.buyer_address, &n.seller_address, &n.peg_hash);
            if n.negotiation_id != expected {
                return Err(PegsettleError::InvalidInput {
                    field: "negotiation_id",
                    reason: format!("{} does not match its parties and peg", n.negotiation_id),
                });
            }
            n.buyer_address.ensure_valid()?;
            n.seller_address.ensure_valid()?;
            if !negotiation_ids.insert(&n.negotiation_id) {
                return Err(duplicate("negotiations", &n.negotiation_id));
            }
        }

        let mut order_ids = HashSet::new();
        for order in &self.orders {
            if !negotiation_ids.contains(&order.negotiation_id) {
                return Err(PegsettleError::NegotiationNotFound(order.negotiation_id.clone()));
            }
            if !order_ids.insert(&order.negotiation_id) {
                return Err(duplicate("orders", &order.negotiation_id));
            }
            order.validate()?;
        }

        let mut addresses = HashSet::new();
        for rep in &self.reputations {
            rep.validate()?;
            if !addresses.insert(&rep.address) {
                return Err(duplicate("reputations", &rep.address));
            }
        }
        Ok(())
    }
}

fn duplicate(field: &'static str, id: &dyn std::fmt::Display) -> PegsettleError {
    PegsettleError::InvalidInput {
        field,
        reason: format!("{id} listed twice"),
    }
}

pub fn init_genesis(keepers: &TradeKeepers, ctx: &mut Context<'_>, genesis: &TradeGenesis) -> Result<()> {
    genesis.validate()?;
    for n in &genesis.negotiations {
        keepers.negotiation.set_negotiation(ctx, n)?;
    }
    for order in &genesis.orders {
        keepers.orders.set_order(ctx, order)?;
    }
    for rep in &genesis.reputations {
        keepers.reputation.set_reputation(ctx, rep)?;
    }
    tracing::info!(
        negotiations = genesis.negotiations.len(),
        orders = genesis.orders.len(),
        reputations = genesis.reputations.len(),
        "Trade genesis loaded"
    );
    Ok(())
}

pub fn export_genesis(keepers: &TradeKeepers, ctx: &Context<'_>) -> Result<TradeGenesis> {
    Ok(TradeGenesis {
        negotiations: keepers.negotiation.negotiations(ctx)?,
        orders: keepers.orders.orders(ctx)?,
        reputations: keepers.reputation.reputations(ctx)?,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{acl_fixture, addr, BUYER, SELLER};
    use pegsettle_store::{Codec, MemStore};
    use pegsettle_types::{
        Acl, Address, AssetPeg, AssetPegWallet, BlockHeader, ErrorKind, FiatPeg, FiatPegWallet, InMemoryDirectory,
        LedgerConfig, PegHash,
    };

    fn keepers(ctx: &mut Context<'_>) -> TradeKeepers {
        let acl = acl_fixture(ctx, Acl::all(), Acl::all());
        TradeKeepers::new(
            Arc::new(Codec::default()),
            acl,
            Arc::new(InMemoryDirectory::new()),
            &LedgerConfig::default(),
        )
    }

    fn with_order(order: impl FnOnce(&mut Order)) -> TradeGenesis {
        let negotiation = Negotiation::proposed(addr(BUYER), addr(SELLER), PegHash::new(b"30".to_vec()), 5, 9);
        let mut o = Order::new(negotiation.negotiation_id.clone());
        order(&mut o);
        TradeGenesis {
            negotiations: vec![negotiation],
            orders: vec![o],
            reputations: Vec::new(),
        }
    }

    #[test]
    fn export_matches_import() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(0));
        let keepers = keepers(&mut ctx);
        let negotiation = Negotiation::proposed(addr(BUYER), addr(SELLER), PegHash::new(b"30".to_vec()), 5, 9);
        let genesis = TradeGenesis {
            orders: vec![Order::new(negotiation.negotiation_id.clone())],
            negotiations: vec![negotiation],
            reputations: vec![AccountReputation::new(addr(SELLER))],
        };
        init_genesis(&keepers, &mut ctx, &genesis).unwrap();
        assert_eq!(export_genesis(&keepers, &ctx).unwrap(), genesis);
    }

    #[test]
    fn mismatched_negotiation_id_rejected() {
        let mut n = Negotiation::proposed(addr(BUYER), addr(SELLER), PegHash::new(vec![1]), 5, 9);
        n.buyer_address = Address::new(vec![7; 20]);
        let genesis = TradeGenesis {
            negotiations: vec![n],
            ..TradeGenesis::default()
        };
        assert!(matches!(
            genesis.validate().unwrap_err(),
            PegsettleError::InvalidInput { field: "negotiation_id", .. }
        ));
    }

    #[test]
    fn unsorted_wallet_document_loads_sorted() {
        let genesis = with_order(|o| {
            o.asset_peg_wallet = AssetPegWallet::from_pegs([AssetPeg::dummy(b"a"), AssetPeg::dummy(b"b")]).unwrap();
        });
        // Hand-edit the document so the wallet lists b before a.
        let mut doc = serde_json::to_value(&genesis).unwrap();
        let wallet = doc["orders"][0]["asset_peg_wallet"].as_array_mut().unwrap();
        wallet.reverse();
        let loaded: TradeGenesis = serde_json::from_value(doc).unwrap();
        assert_eq!(loaded, genesis);

        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(0));
        let keepers = keepers(&mut ctx);
        init_genesis(&keepers, &mut ctx, &loaded).unwrap();
        let remaining = keepers
            .orders
            .debit_asset(&mut ctx, &addr(BUYER), &addr(SELLER), &PegHash::new(b"b".to_vec()))
            .unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn duplicated_wallet_document_rejected() {
        let genesis = with_order(|o| {
            o.asset_peg_wallet = AssetPegWallet::from_pegs([AssetPeg::dummy(b"a")]).unwrap();
        });
        let mut doc = serde_json::to_value(&genesis).unwrap();
        let wallet = doc["orders"][0]["asset_peg_wallet"].as_array_mut().unwrap();
        let copy = wallet[0].clone();
        wallet.push(copy);
        assert!(serde_json::from_value::<TradeGenesis>(doc).is_err());
    }

    #[test]
    fn overflowing_order_rejected_before_any_write() {
        let genesis = with_order(|o| {
            o.fiat_peg_wallet =
                FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", i64::MAX), FiatPeg::dummy(b"f2", i64::MAX)]).unwrap();
        });
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(0));
        let keepers = keepers(&mut ctx);
        let err = init_genesis(&keepers, &mut ctx, &genesis).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(keepers.negotiation.negotiations(&ctx).unwrap().is_empty());
        assert!(keepers.orders.orders(&ctx).unwrap().is_empty());
    }

    #[test]
    fn orphan_and_repeated_records_rejected() {
        let mut genesis = with_order(|_| {});
        genesis.negotiations.clear();
        assert!(matches!(genesis.validate().unwrap_err(), PegsettleError::NegotiationNotFound(_)));

        let mut genesis = with_order(|_| {});
        genesis.orders.push(genesis.orders[0].clone());
        assert!(matches!(genesis.validate().unwrap_err(), PegsettleError::InvalidInput { field: "orders", .. }));

        let mut genesis = with_order(|_| {});
        genesis.reputations = vec![AccountReputation::new(addr(SELLER)); 2];
        assert!(matches!(
            genesis.validate().unwrap_err(),
            PegsettleError::InvalidInput { field: "reputations", .. }
        ));
    }

    #[test]
    fn inconsistent_reputation_rejected() {
        let mut genesis = with_order(|_| {});
        let mut rep = AccountReputation::new(addr(SELLER));
        rep.rating = rust_decimal::Decimal::from(42);
        genesis.reputations.push(rep);
        assert!(matches!(genesis.validate().unwrap_err(), PegsettleError::InvalidInput { field: "rating", .. }));
    }
}
