//! Escrow order ledger: ledger-held custody of pegs for one negotiated trade.
//!
//! Orders share their key with the negotiation (`buyer ∥ seller ∥ peg_hash`).
//! An order is created lazily by the first credit and never deleted; its
//! wallets may drain to empty. Credits and debits move whole pegs.

use std::sync::Arc;

use pegsettle_acl::AclKeeper;
use pegsettle_store::{Codec, Context};
use pegsettle_types::{
    keys, Address, AssetPeg, AssetPegWallet, Capability, Event, FiatPegWallet, NegotiationId, Order,
    OrderDetails, PegHash, PegsettleError, Result,
};

#[derive(Debug, Clone)]
pub struct OrderKeeper {
    codec: Arc<Codec>,
    acl: AclKeeper,
}

impl OrderKeeper {
    #[must_use]
    pub fn new(codec: Arc<Codec>, acl: AclKeeper) -> Self {
        Self { codec, acl }
    }

    pub fn get_order(&self, ctx: &Context<'_>, id: &NegotiationId) -> Result<Option<Order>> {
        ctx.load(&self.codec, &keys::order_key(id))
    }

    pub fn set_order(&self, ctx: &mut Context<'_>, order: &Order) -> Result<()> {
        ctx.save(&self.codec, &keys::order_key(&order.negotiation_id), order)
    }

    fn load_or_new(&self, ctx: &Context<'_>, id: NegotiationId) -> Result<Order> {
        Ok(self.get_order(ctx, &id)?.unwrap_or_else(|| Order::new(id)))
    }

    fn existing(&self, ctx: &Context<'_>, id: &NegotiationId) -> Result<Order> {
        self.get_order(ctx, id)?
            .ok_or_else(|| PegsettleError::OrderNotFound(id.clone()))
    }

    pub fn get_order_details(
        &self,
        ctx: &Context<'_>,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
    ) -> Result<OrderDetails> {
        let id = NegotiationId::derive(buyer, seller, peg_hash);
        self.existing(ctx, &id).map(OrderDetails::from)
    }

    pub fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        Ok(ctx
            .load_all(&self.codec, &[keys::ORDER_PREFIX])?
            .into_iter()
            .map(|(_, order)| order)
            .collect())
    }

    // -----------------------------------------------------------------
    // Credits
    // -----------------------------------------------------------------

    /// Move `asset_peg` from the seller (`from`) into the order with buyer `to`.
    pub fn credit_asset(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        asset_peg: &AssetPeg,
    ) -> Result<Order> {
        from.ensure_valid()?;
        to.ensure_valid()?;
        asset_peg.validate()?;
        self.acl.require(ctx, from, Capability::SendAsset)?;
        if asset_peg.locked {
            return Err(PegsettleError::AssetLocked(asset_peg.peg_hash.clone()));
        }

        let id = NegotiationId::derive(to, from, &asset_peg.peg_hash);
        let mut order = self.load_or_new(ctx, id)?;
        order.asset_peg_wallet.insert(asset_peg.clone())?;
        self.set_order(ctx, &order)?;

        ctx.emit(
            Event::new("send_asset_to_order")
                .attr("negotiation_id", &order.negotiation_id)
                .attr("seller", from)
                .attr("buyer", to)
                .attr("peg_hash", &asset_peg.peg_hash),
        );
        tracing::info!(
            order = %order.negotiation_id,
            seller = %from,
            peg = %asset_peg.peg_hash,
            "Asset peg credited to order"
        );
        Ok(order)
    }

    /// Move `fiat_wallet` from the buyer (`from`) into the order with seller
    /// `to` for the asset `peg_hash`. All pegs move or none do, and the
    /// order's total must stay within `i64`.
    pub fn credit_fiat(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        peg_hash: &PegHash,
        fiat_wallet: &FiatPegWallet,
    ) -> Result<Order> {
        from.ensure_valid()?;
        to.ensure_valid()?;
        peg_hash.ensure_present()?;
        self.acl.require(ctx, from, Capability::SendFiat)?;
        if fiat_wallet.is_empty() {
            return Err(PegsettleError::InvalidInput {
                field: "fiat_peg_wallet",
                reason: "must carry at least one fiat peg".into(),
            });
        }
        fiat_wallet.validate()?;
        let amount = fiat_wallet.balance()?;

        let id = NegotiationId::derive(from, to, peg_hash);
        let mut order = self.load_or_new(ctx, id)?;
        order.fiat_peg_wallet.merge(fiat_wallet)?;
        let held = order.fiat_peg_wallet.balance()?;
        self.set_order(ctx, &order)?;

        ctx.emit(
            Event::new("send_fiat_to_order")
                .attr("negotiation_id", &order.negotiation_id)
                .attr("buyer", from)
                .attr("seller", to)
                .attr("peg_hash", peg_hash)
                .attr("amount", amount),
        );
        tracing::info!(
            order = %order.negotiation_id,
            buyer = %from,
            pegs = fiat_wallet.len(),
            amount,
            held,
            "Fiat pegs credited to order"
        );
        Ok(order)
    }

    // -----------------------------------------------------------------
    // Debits
    // -----------------------------------------------------------------

    /// Release the asset peg `peg_hash` out of the order. Returns the order's
    /// remaining asset wallet.
    pub fn debit_asset(
        &self,
        ctx: &mut Context<'_>,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
    ) -> Result<AssetPegWallet> {
        self.acl.require(ctx, buyer, Capability::BuyerExecuteOrder)?;
        let id = NegotiationId::derive(buyer, seller, peg_hash);
        let mut order = self.existing(ctx, &id)?;
        order.asset_peg_wallet.remove(peg_hash)?;
        self.set_order(ctx, &order)?;
        tracing::info!(order = %id, peg = %peg_hash, "Asset peg released from order");
        Ok(order.asset_peg_wallet)
    }

    /// Release every peg of `fiat_wallet` out of the order. Returns the
    /// order's remaining fiat wallet.
    pub fn debit_fiat(
        &self,
        ctx: &mut Context<'_>,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
        fiat_wallet: &FiatPegWallet,
    ) -> Result<FiatPegWallet> {
        self.acl.require(ctx, seller, Capability::SellerExecuteOrder)?;
        let id = NegotiationId::derive(buyer, seller, peg_hash);
        let mut order = self.existing(ctx, &id)?;
        order.fiat_peg_wallet.subtract(fiat_wallet)?;
        self.set_order(ctx, &order)?;
        tracing::info!(order = %id, pegs = fiat_wallet.len(), "Fiat pegs released from order");
        Ok(order.fiat_peg_wallet)
    }

    // -----------------------------------------------------------------
    // Completion proofs
    // -----------------------------------------------------------------

    /// Attach the buyer's fiat-transfer proof. Set once.
    pub fn set_fiat_proof_hash(
        &self,
        ctx: &mut Context<'_>,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
        proof_hash: &str,
    ) -> Result<Order> {
        self.acl.require(ctx, buyer, Capability::BuyerExecuteOrder)?;
        self.set_proof(ctx, buyer, seller, peg_hash, proof_hash, Proof::Fiat)
    }

    /// Attach the seller's shipment (air waybill) proof. Set once.
    pub fn set_awb_proof_hash(
        &self,
        ctx: &mut Context<'_>,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
        proof_hash: &str,
    ) -> Result<Order> {
        self.acl.require(ctx, seller, Capability::SellerExecuteOrder)?;
        self.set_proof(ctx, buyer, seller, peg_hash, proof_hash, Proof::Awb)
    }

    fn set_proof(
        &self,
        ctx: &mut Context<'_>,
        buyer: &Address,
        seller: &Address,
        peg_hash: &PegHash,
        proof_hash: &str,
        proof: Proof,
    ) -> Result<Order> {
        if proof_hash.is_empty() {
            return Err(PegsettleError::InvalidInput {
                field: proof.field(),
                reason: "must not be empty".into(),
            });
        }
        let id = NegotiationId::derive(buyer, seller, peg_hash);
        let mut order = self.existing(ctx, &id)?;
        let slot = match proof {
            Proof::Fiat => &mut order.fiat_proof_hash,
            Proof::Awb => &mut order.awb_proof_hash,
        };
        if !slot.is_empty() {
            return Err(PegsettleError::ProofAlreadySet {
                id,
                proof: proof.label(),
            });
        }
        *slot = proof_hash.to_string();
        self.set_order(ctx, &order)?;
        tracing::info!(
            order = %id,
            proof = proof.label(),
            executed = order.is_executed(),
            "Completion proof recorded"
        );
        Ok(order)
    }
}

#[derive(Debug, Clone, Copy)]
enum Proof {
    Fiat,
    Awb,
}

impl Proof {
    fn label(self) -> &'static str {
        match self {
            Self::Fiat => "fiat",
            Self::Awb => "awb",
        }
    }

    fn field(self) -> &'static str {
        match self {
            Self::Fiat => "fiat_proof_hash",
            Self::Awb => "awb_proof_hash",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{acl_fixture, addr, BUYER, SELLER};
    use pegsettle_store::MemStore;
    use pegsettle_types::{Acl, BlockHeader, ErrorKind, FiatPeg};

    fn keeper(acl: AclKeeper) -> OrderKeeper {
        OrderKeeper::new(Arc::new(Codec::default()), acl)
    }

    #[test]
    fn credit_then_debit_asset_drains_wallet() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let peg = AssetPeg::dummy(b"30");

        let order = orders.credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &peg).unwrap();
        assert_eq!(
            order.negotiation_id,
            NegotiationId::derive(&addr(BUYER), &addr(SELLER), &peg.peg_hash)
        );
        assert_eq!(order.asset_peg_wallet.len(), 1);

        let remaining = orders
            .debit_asset(&mut ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash)
            .unwrap();
        assert!(remaining.is_empty());
        let details = orders
            .get_order_details(&ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash)
            .unwrap();
        assert!(details.asset_peg_wallet.is_empty());
    }

    #[test]
    fn debit_absent_peg_fails() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let peg = AssetPeg::dummy(b"30");
        orders.credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &peg).unwrap();
        orders
            .debit_asset(&mut ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash)
            .unwrap();

        let err = orders
            .debit_asset(&mut ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash)
            .unwrap_err();
        assert!(matches!(err, PegsettleError::PegNotFound(_)));

        let err = orders
            .debit_asset(&mut ctx, &addr(BUYER), &addr(SELLER), &PegHash::new(b"99".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PegsettleError::OrderNotFound(_)));
    }

    #[test]
    fn duplicate_asset_credit_rejected() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let peg = AssetPeg::dummy(b"30");
        orders.credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &peg).unwrap();
        let err = orders
            .credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &peg)
            .unwrap_err();
        assert!(matches!(err, PegsettleError::DuplicatePeg(_)));
    }

    #[test]
    fn locked_asset_rejected() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let mut peg = AssetPeg::dummy(b"30");
        peg.locked = true;
        let err = orders
            .credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &peg)
            .unwrap_err();
        assert!(matches!(err, PegsettleError::AssetLocked(_)));
        assert!(orders.orders(&ctx).unwrap().is_empty());
    }

    #[test]
    fn credit_requires_send_capability() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let no_send = Acl::from_capabilities([Capability::BuyerExecuteOrder]);
        let orders = keeper(acl_fixture(&mut ctx, no_send, no_send));

        let err = orders
            .credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &AssetPeg::dummy(b"30"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let fiat = FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", 500)]).unwrap();
        let err = orders
            .credit_fiat(&mut ctx, &addr(BUYER), &addr(SELLER), &PegHash::new(b"30".to_vec()), &fiat)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn fiat_credit_and_partial_debit() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let peg_hash = PegHash::new(b"30".to_vec());
        let fiat =
            FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", 500), FiatPeg::dummy(b"f2", 700)]).unwrap();

        let order = orders
            .credit_fiat(&mut ctx, &addr(BUYER), &addr(SELLER), &peg_hash, &fiat)
            .unwrap();
        assert_eq!(order.fiat_peg_wallet.balance().unwrap(), 1200);

        let out = FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", 500)]).unwrap();
        let remaining = orders
            .debit_fiat(&mut ctx, &addr(BUYER), &addr(SELLER), &peg_hash, &out)
            .unwrap();
        assert_eq!(remaining.balance().unwrap(), 700);

        let err = orders
            .debit_fiat(&mut ctx, &addr(BUYER), &addr(SELLER), &peg_hash, &out)
            .unwrap_err();
        assert!(matches!(err, PegsettleError::PegNotFound(_)));
    }

    #[test]
    fn cumulative_fiat_overflow_leaves_order_untouched() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let peg_hash = PegHash::new(b"30".to_vec());
        let first = FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", i64::MAX)]).unwrap();
        orders
            .credit_fiat(&mut ctx, &addr(BUYER), &addr(SELLER), &peg_hash, &first)
            .unwrap();

        let second = FiatPegWallet::from_pegs([FiatPeg::dummy(b"f2", 1)]).unwrap();
        let err = orders
            .credit_fiat(&mut ctx, &addr(BUYER), &addr(SELLER), &peg_hash, &second)
            .unwrap_err();
        assert!(matches!(err, PegsettleError::InvalidInput { field: "fiat_peg_wallet", .. }));

        let details = orders
            .get_order_details(&ctx, &addr(BUYER), &addr(SELLER), &peg_hash)
            .unwrap();
        assert_eq!(details.fiat_peg_wallet.len(), 1);
        assert_eq!(details.fiat_peg_wallet.balance().unwrap(), i64::MAX);
    }

    #[test]
    fn short_party_address_rejected() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let err = orders
            .credit_asset(&mut ctx, &Address::new(b"ab".to_vec()), &addr(BUYER), &AssetPeg::dummy(b"30"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(orders.orders(&ctx).unwrap().is_empty());
    }

    #[test]
    fn proofs_set_once_and_mark_execution() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let peg = AssetPeg::dummy(b"30");
        orders.credit_asset(&mut ctx, &addr(SELLER), &addr(BUYER), &peg).unwrap();

        let order = orders
            .set_fiat_proof_hash(&mut ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash, "fiat-proof")
            .unwrap();
        assert!(!order.is_executed());
        let err = orders
            .set_fiat_proof_hash(&mut ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash, "again")
            .unwrap_err();
        assert!(matches!(err, PegsettleError::ProofAlreadySet { proof: "fiat", .. }));

        let order = orders
            .set_awb_proof_hash(&mut ctx, &addr(BUYER), &addr(SELLER), &peg.peg_hash, "awb-proof")
            .unwrap();
        assert!(order.is_executed());
    }

    #[test]
    fn proof_on_missing_order_is_not_found() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
        let orders = keeper(acl_fixture(&mut ctx, Acl::all(), Acl::all()));
        let err = orders
            .set_awb_proof_hash(&mut ctx, &addr(BUYER), &addr(SELLER), &PegHash::new(b"1".to_vec()), "p")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
