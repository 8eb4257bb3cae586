//! Integration test: a full trade driven through `handle_trade_msg`.
//!
//! Bid change, two-sided confirmation, escrow custody, execution, and
//! feedback, in that order, for buyer B and seller S over peg "30".

use std::sync::Arc;

use pegsettle_acl::{init_genesis, AclGenesis, AclKeeper, OrganizationEntry, ZoneEntry};
use pegsettle_store::{Codec, Context, MemStore};
use pegsettle_trade::{
    handle_trade_msg, BidConfirmation, BidProposal, ExecuteOrder, Feedback, SendAsset, SendFiat,
    TradeKeepers, TradeMsg,
};
use pegsettle_types::testkit::TestSigner;
use pegsettle_types::{
    Acl, AclAccount, Address, AssetPeg, BlockHeader, FeedbackCategory, FiatPeg, FiatPegWallet,
    InMemoryDirectory, LedgerConfig, NegotiationId, NegotiationStatus, Organization, OrganizationId,
    ErrorKind, PegHash, PegsettleError, TxCounter, ZoneId,
};
use rust_decimal::Decimal;

const PEG: &[u8] = b"30";

struct Trade {
    keepers: TradeKeepers,
    cfg: LedgerConfig,
    buyer: TestSigner,
    seller: TestSigner,
}

fn setup(ctx: &mut Context<'_>) -> Trade {
    let buyer = TestSigner::from_seed(11);
    let seller = TestSigner::from_seed(12);
    let codec = Arc::new(Codec::default());
    let acl = AclKeeper::new(codec.clone());

    let zone_id = ZoneId::new(vec![1]);
    let organization_id = OrganizationId::new(vec![2]);
    let account = |address: Address| AclAccount {
        address,
        zone_id: zone_id.clone(),
        organization_id: organization_id.clone(),
        acl: Acl::all(),
    };
    let genesis = AclGenesis {
        authority: Some(Address::new(vec![0xa0; 20])),
        zones: vec![ZoneEntry {
            zone_id: zone_id.clone(),
            address: Address::new(vec![0xb0; 20]),
        }],
        organizations: vec![OrganizationEntry {
            organization_id: organization_id.clone(),
            organization: Organization {
                address: Address::new(vec![0xc0; 20]),
                zone_id: zone_id.clone(),
            },
        }],
        accounts: vec![account(buyer.address()), account(seller.address())],
    };
    init_genesis(&acl, ctx, &genesis).unwrap();

    let mut directory = InMemoryDirectory::new();
    buyer.register(&mut directory);
    seller.register(&mut directory);
    let cfg = LedgerConfig::default();
    Trade {
        keepers: TradeKeepers::new(codec, acl, Arc::new(directory), &cfg),
        cfg,
        buyer,
        seller,
    }
}

impl Trade {
    fn id(&self) -> NegotiationId {
        NegotiationId::derive(&self.buyer.address(), &self.seller.address(), &PegHash::new(PEG.to_vec()))
    }

    fn proposal(&self, bid: i64, time: i64) -> BidProposal {
        BidProposal {
            buyer: self.buyer.address(),
            seller: self.seller.address(),
            peg_hash: PegHash::new(PEG.to_vec()),
            bid,
            time,
        }
    }

    /// Sign the stored terms with `bid` substituted.
    fn confirmation(&self, ctx: &Context<'_>, signer: &TestSigner, bid: i64) -> BidConfirmation {
        let mut terms = self.keepers.negotiation.negotiation(ctx, &self.id()).unwrap();
        terms.bid = bid;
        BidConfirmation {
            buyer: self.buyer.address(),
            seller: self.seller.address(),
            peg_hash: PegHash::new(PEG.to_vec()),
            bid,
            signature: signer.sign_negotiation(&terms),
            contract_hash: "contract-30".into(),
        }
    }

    fn send_fiat(&self, pegs: Vec<FiatPeg>) -> TradeMsg {
        TradeMsg::SendFiatsToOrder(vec![SendFiat {
            buyer: self.buyer.address(),
            seller: self.seller.address(),
            peg_hash: PegHash::new(PEG.to_vec()),
            fiat_peg_wallet: FiatPegWallet::from_pegs(pegs).unwrap(),
        }])
    }

    fn run(&self, ctx: &mut Context<'_>, msg: TradeMsg) -> Result<(), PegsettleError> {
        handle_trade_msg(&self.keepers, ctx, &self.cfg, &msg)
    }

    fn execute(&self, proof: &str) -> ExecuteOrder {
        ExecuteOrder {
            buyer: self.buyer.address(),
            seller: self.seller.address(),
            peg_hash: PegHash::new(PEG.to_vec()),
            proof_hash: proof.into(),
        }
    }

    fn feedback(&self, score: i64) -> Feedback {
        Feedback {
            buyer: self.buyer.address(),
            seller: self.seller.address(),
            peg_hash: PegHash::new(PEG.to_vec()),
            score,
        }
    }

    /// Negotiate to CONFIRMED at the context's height.
    fn confirm(&self, ctx: &mut Context<'_>, bid: i64, time: i64) {
        self.run(ctx, TradeMsg::ChangeBuyerBids(vec![self.proposal(bid, time)])).unwrap();
        let c = self.confirmation(ctx, &self.seller, bid);
        self.run(ctx, TradeMsg::ConfirmSellerBids(vec![c])).unwrap();
        let c = self.confirmation(ctx, &self.buyer, bid);
        self.run(ctx, TradeMsg::ConfirmBuyerBids(vec![c])).unwrap();
    }
}

#[test]
fn negotiate_settle_and_rate() {
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, BlockHeader::at_height(100));
    let t = setup(&mut ctx);

    // Buyer opens at 1000, seller counters at 1200.
    t.run(&mut ctx, TradeMsg::ChangeBuyerBids(vec![t.proposal(1000, 50)])).unwrap();
    t.run(&mut ctx, TradeMsg::ChangeSellerBids(vec![t.proposal(1200, 50)])).unwrap();
    let n = t.keepers.negotiation.negotiation(&ctx, &t.id()).unwrap();
    assert_eq!((n.bid, n.status()), (1200, NegotiationStatus::Proposed));

    // Buyer confirms the stale price.
    let stale = t.confirmation(&ctx, &t.buyer, 1000);
    let err = t.run(&mut ctx, TradeMsg::ConfirmBuyerBids(vec![stale])).unwrap_err();
    assert!(matches!(err, PegsettleError::BidMismatch { stored: 1200, submitted: 1000 }));

    let c = t.confirmation(&ctx, &t.seller, 1200);
    t.run(&mut ctx, TradeMsg::ConfirmSellerBids(vec![c])).unwrap();
    let c = t.confirmation(&ctx, &t.buyer, 1200);
    t.run(&mut ctx, TradeMsg::ConfirmBuyerBids(vec![c.clone()])).unwrap();
    let n = t.keepers.negotiation.negotiation(&ctx, &t.id()).unwrap();
    assert!(n.is_confirmed());
    assert_eq!(n.seller_block_height, 100);

    // A third confirmation is rejected.
    let err = t.run(&mut ctx, TradeMsg::ConfirmBuyerBids(vec![c])).unwrap_err();
    assert!(matches!(err, PegsettleError::SignaturesAlreadyExist(_)));

    // Custody.
    t.run(
        &mut ctx,
        TradeMsg::SendAssetsToOrder(vec![SendAsset {
            seller: t.seller.address(),
            buyer: t.buyer.address(),
            asset_peg: AssetPeg::dummy(PEG),
        }]),
    )
    .unwrap();
    let fiat = FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", 700), FiatPeg::dummy(b"f2", 500)]).unwrap();
    t.run(
        &mut ctx,
        TradeMsg::SendFiatsToOrder(vec![SendFiat {
            buyer: t.buyer.address(),
            seller: t.seller.address(),
            peg_hash: PegHash::new(PEG.to_vec()),
            fiat_peg_wallet: fiat,
        }]),
    )
    .unwrap();

    // Feedback before execution is refused.
    let err = t.run(&mut ctx, TradeMsg::BuyerFeedbacks(vec![t.feedback(90)])).unwrap_err();
    assert!(matches!(err, PegsettleError::TransactionNotCompleted(_)));

    t.run(&mut ctx, TradeMsg::BuyerExecuteOrders(vec![t.execute("fiat-proof")])).unwrap();
    t.run(&mut ctx, TradeMsg::SellerExecuteOrders(vec![t.execute("awb-proof")])).unwrap();
    let order = t.keepers.orders.get_order(&ctx, &t.id()).unwrap().unwrap();
    assert!(order.is_executed());
    assert_eq!(order.fiat_peg_wallet.balance().unwrap(), 1200);

    t.run(&mut ctx, TradeMsg::BuyerFeedbacks(vec![t.feedback(90)])).unwrap();
    t.run(&mut ctx, TradeMsg::SellerFeedbacks(vec![t.feedback(70)])).unwrap();
    let err = t.run(&mut ctx, TradeMsg::BuyerFeedbacks(vec![t.feedback(10)])).unwrap_err();
    assert!(matches!(err, PegsettleError::DuplicateFeedback { .. }));

    let seller_rep = t.keepers.reputation.get_reputation(&ctx, &t.seller.address()).unwrap();
    assert_eq!(seller_rep.rating, Decimal::from(90));
    let counters = &seller_rep.transaction_feedback;
    let one = TxCounter { positive: 1, negative: 0 };
    assert_eq!(counters.counter(FeedbackCategory::ChangeSellerBid), one);
    assert_eq!(counters.counter(FeedbackCategory::ConfirmSellerBid), one);
    assert_eq!(counters.counter(FeedbackCategory::Negotiation), one);
    assert_eq!(counters.counter(FeedbackCategory::SendAsset), one);
    assert_eq!(counters.counter(FeedbackCategory::SellerExecuteOrder), one);

    let buyer_rep = t.keepers.reputation.get_reputation(&ctx, &t.buyer.address()).unwrap();
    assert_eq!(buyer_rep.rating, Decimal::from(70));
    assert_eq!(buyer_rep.transaction_feedback.counter(FeedbackCategory::SendFiat), one);
    assert_eq!(buyer_rep.transaction_feedback.counter(FeedbackCategory::BuyerExecuteOrder), one);

    let kinds: Vec<_> = ctx.events().iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "change_buyer_bid",
            "change_seller_bid",
            "confirm_seller_bid",
            "confirm_buyer_bid",
            "send_asset_to_order",
            "send_fiat_to_order",
            "buyer_execute_order",
            "seller_execute_order",
            "buyer_feedback",
            "seller_feedback",
        ]
    );
}

#[test]
fn custody_requires_confirmed_negotiation() {
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
    let t = setup(&mut ctx);
    let send = TradeMsg::SendAssetsToOrder(vec![SendAsset {
        seller: t.seller.address(),
        buyer: t.buyer.address(),
        asset_peg: AssetPeg::dummy(PEG),
    }]);

    let err = t.run(&mut ctx, send.clone()).unwrap_err();
    assert!(matches!(err, PegsettleError::NegotiationNotFound(_)));

    t.run(&mut ctx, TradeMsg::ChangeBuyerBids(vec![t.proposal(500, 10)])).unwrap();
    let err = t.run(&mut ctx, send).unwrap_err();
    assert!(matches!(err, PegsettleError::NegotiationNotConfirmed(_)));
    assert!(t.keepers.orders.get_order(&ctx, &t.id()).unwrap().is_none());
}

#[test]
fn custody_after_expiry_rejected() {
    let mut store = MemStore::new();
    {
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(10));
        let t = setup(&mut ctx);
        t.confirm(&mut ctx, 800, 5);
    }

    // Window is seller height 10 + 5 blocks: height 15 is the last valid one.
    {
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(15));
        let t = setup(&mut ctx);
        let send = TradeMsg::SendAssetsToOrder(vec![SendAsset {
            seller: t.seller.address(),
            buyer: t.buyer.address(),
            asset_peg: AssetPeg::dummy(PEG),
        }]);
        t.run(&mut ctx, send).unwrap();
    }

    let mut ctx = Context::new(&mut store, BlockHeader::at_height(16));
    let t = setup(&mut ctx);
    let fiat = FiatPegWallet::from_pegs([FiatPeg::dummy(b"f1", 800)]).unwrap();
    let err = t
        .run(
            &mut ctx,
            TradeMsg::SendFiatsToOrder(vec![SendFiat {
                buyer: t.buyer.address(),
                seller: t.seller.address(),
                peg_hash: PegHash::new(PEG.to_vec()),
                fiat_peg_wallet: fiat,
            }]),
        )
        .unwrap_err();
    assert!(matches!(err, PegsettleError::NegotiationExpired { expired_at: 15, .. }));
}

#[test]
fn failed_entry_rolls_back_whole_message() {
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
    let t = setup(&mut ctx);
    t.confirm(&mut ctx, 800, 100);

    // Second proposal targets the already-signed negotiation.
    let fresh = BidProposal {
        peg_hash: PegHash::new(b"31".to_vec()),
        ..t.proposal(10, 10)
    };
    let err = t
        .run(&mut ctx, TradeMsg::ChangeBuyerBids(vec![fresh.clone(), t.proposal(900, 10)]))
        .unwrap_err();
    assert!(matches!(err, PegsettleError::AlreadySigned(_)));
    let fresh_id = NegotiationId::derive(&fresh.buyer, &fresh.seller, &fresh.peg_hash);
    assert!(t.keepers.negotiation.get_negotiation(&ctx, &fresh_id).unwrap().is_none());
}

#[test]
fn shifted_party_bytes_cannot_reprice_a_trade() {
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
    let t = setup(&mut ctx);
    t.run(&mut ctx, TradeMsg::ChangeBuyerBids(vec![t.proposal(1000, 10)])).unwrap();

    // buyer ++ seller[..1] and seller[1..] concatenate to the same key.
    let seller = t.seller.address();
    let (head, tail) = seller.as_bytes().split_at(1);
    let stranger = BidProposal {
        buyer: Address::new([t.buyer.address().as_bytes(), head].concat()),
        seller: Address::new(tail.to_vec()),
        ..t.proposal(1, 10)
    };
    assert_eq!(NegotiationId::derive(&stranger.buyer, &stranger.seller, &stranger.peg_hash), t.id());

    for msg in [
        TradeMsg::ChangeBuyerBids(vec![stranger.clone()]),
        TradeMsg::ChangeSellerBids(vec![stranger]),
    ] {
        let err = t.run(&mut ctx, msg).unwrap_err();
        assert!(matches!(err, PegsettleError::InvalidInput { field: "address", .. }));
    }
    let n = t.keepers.negotiation.negotiation(&ctx, &t.id()).unwrap();
    assert_eq!((n.bid, &n.buyer_address, &n.seller_address), (1000, &t.buyer.address(), &seller));
    assert_eq!(t.keepers.negotiation.negotiations(&ctx).unwrap().len(), 1);
}

#[test]
fn extreme_fiat_amounts_fail_cleanly() {
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, BlockHeader::at_height(1));
    let t = setup(&mut ctx);
    t.confirm(&mut ctx, 800, 100);

    let err = t
        .run(&mut ctx, t.send_fiat(vec![FiatPeg::dummy(b"f1", i64::MAX), FiatPeg::dummy(b"f2", i64::MAX)]))
        .unwrap_err();
    assert!(matches!(err, PegsettleError::InvalidInput { field: "fiat_peg_wallet", .. }));
    assert!(t.keepers.orders.get_order(&ctx, &t.id()).unwrap().is_none());

    let mut over_redeemed = FiatPeg::dummy(b"f1", 100);
    over_redeemed.redeemed_amount = 150;
    let err = t.run(&mut ctx, t.send_fiat(vec![over_redeemed])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Each message is in range; together they are not.
    t.run(&mut ctx, t.send_fiat(vec![FiatPeg::dummy(b"f1", i64::MAX)])).unwrap();
    let err = t.run(&mut ctx, t.send_fiat(vec![FiatPeg::dummy(b"f2", 1)])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let order = t.keepers.orders.get_order(&ctx, &t.id()).unwrap().unwrap();
    assert_eq!(order.fiat_peg_wallet.balance().unwrap(), i64::MAX);
    let buyer_rep = t.keepers.reputation.get_reputation(&ctx, &t.buyer.address()).unwrap();
    assert_eq!(
        buyer_rep.transaction_feedback.counter(FeedbackCategory::SendFiat),
        TxCounter { positive: 1, negative: 0 }
    );
}
