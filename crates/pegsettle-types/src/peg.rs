//! Pegged instruments and the wallets that hold them.
//!
//! Pegs are non-fungible: a wallet is a set keyed by [`PegHash`], kept sorted
//! so that its serialized form is canonical. Merges and subtractions move
//! whole entries and are all-or-nothing. Deserialization goes through
//! [`PegWallet::from_pegs`], so a decoded wallet is sorted and duplicate-free
//! no matter what order the document lists it in.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Address, PegHash, PegsettleError, Result};

/// One tokenized off-chain asset unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPeg {
    pub peg_hash: PegHash,
    pub document_hash: String,
    pub asset_type: String,
    pub asset_quantity: i64,
    pub asset_price: i64,
    pub quantity_unit: String,
    pub moderated: bool,
    pub locked: bool,
    /// When set, only this address may buy the peg.
    pub taker_address: Option<Address>,
}

/// A holder's share of a fiat deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub owner_address: Address,
    pub amount: i64,
}

/// One tokenized off-chain fiat deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatPeg {
    pub peg_hash: PegHash,
    pub transaction_id: String,
    pub transaction_amount: i64,
    pub redeemed_amount: i64,
    pub owners: Vec<Owner>,
}

fn ensure_non_negative(field: &'static str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(PegsettleError::InvalidInput {
            field,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

impl AssetPeg {
    pub fn validate(&self) -> Result<()> {
        self.peg_hash.ensure_present()?;
        ensure_non_negative("asset_quantity", self.asset_quantity)?;
        ensure_non_negative("asset_price", self.asset_price)
    }
}

impl FiatPeg {
    /// Amounts are non-negative and no more than the deposit is redeemed.
    pub fn validate(&self) -> Result<()> {
        self.peg_hash.ensure_present()?;
        ensure_non_negative("transaction_amount", self.transaction_amount)?;
        ensure_non_negative("redeemed_amount", self.redeemed_amount)?;
        if self.redeemed_amount > self.transaction_amount {
            return Err(PegsettleError::InvalidInput {
                field: "redeemed_amount",
                reason: format!(
                    "{} exceeds transaction amount {}",
                    self.redeemed_amount, self.transaction_amount
                ),
            });
        }
        for owner in &self.owners {
            ensure_non_negative("owner_amount", owner.amount)?;
        }
        Ok(())
    }

    /// Amount still backed by the deposit.
    #[must_use]
    pub fn outstanding(&self) -> i64 {
        self.transaction_amount.saturating_sub(self.redeemed_amount)
    }
}

/// Anything that lives in a peg wallet.
pub trait Pegged {
    fn peg_hash(&self) -> &PegHash;

    /// Stateless field checks.
    fn validate(&self) -> Result<()>;
}

impl Pegged for AssetPeg {
    fn peg_hash(&self) -> &PegHash {
        &self.peg_hash
    }

    fn validate(&self) -> Result<()> {
        AssetPeg::validate(self)
    }
}

impl Pegged for FiatPeg {
    fn peg_hash(&self) -> &PegHash {
        &self.peg_hash
    }

    fn validate(&self) -> Result<()> {
        FiatPeg::validate(self)
    }
}

/// Set of pegs unique by [`PegHash`], sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PegWallet<P> {
    pegs: Vec<P>,
}

impl<'de, P> Deserialize<'de> for PegWallet<P>
where
    P: Pegged + Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pegs = Vec::<P>::deserialize(deserializer)?;
        Self::from_pegs(pegs).map_err(serde::de::Error::custom)
    }
}

pub type AssetPegWallet = PegWallet<AssetPeg>;
pub type FiatPegWallet = PegWallet<FiatPeg>;

impl<P> Default for PegWallet<P> {
    fn default() -> Self {
        Self { pegs: Vec::new() }
    }
}

impl<P: Pegged + Clone> PegWallet<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a wallet from arbitrary entries, rejecting duplicates.
    pub fn from_pegs(pegs: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut wallet = Self::new();
        for peg in pegs {
            wallet.insert(peg)?;
        }
        Ok(wallet)
    }

    fn position(&self, peg_hash: &PegHash) -> std::result::Result<usize, usize> {
        self.pegs.binary_search_by(|p| p.peg_hash().cmp(peg_hash))
    }

    #[must_use]
    pub fn get(&self, peg_hash: &PegHash) -> Option<&P> {
        self.position(peg_hash).ok().map(|i| &self.pegs[i])
    }

    #[must_use]
    pub fn contains(&self, peg_hash: &PegHash) -> bool {
        self.position(peg_hash).is_ok()
    }

    /// Insert one peg. Fails with `DuplicatePeg` if already held.
    pub fn insert(&mut self, peg: P) -> Result<()> {
        match self.position(peg.peg_hash()) {
            Ok(_) => Err(PegsettleError::DuplicatePeg(peg.peg_hash().clone())),
            Err(at) => {
                self.pegs.insert(at, peg);
                Ok(())
            }
        }
    }

    /// Remove one peg by hash. Fails with `PegNotFound` if absent.
    pub fn remove(&mut self, peg_hash: &PegHash) -> Result<P> {
        match self.position(peg_hash) {
            Ok(at) => Ok(self.pegs.remove(at)),
            Err(_) => Err(PegsettleError::PegNotFound(peg_hash.clone())),
        }
    }

    /// Add every entry of `other`. Nothing is added if any entry is a duplicate.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if let Some(dup) = other.pegs.iter().find(|p| self.contains(p.peg_hash())) {
            return Err(PegsettleError::DuplicatePeg(dup.peg_hash().clone()));
        }
        for peg in &other.pegs {
            self.insert(peg.clone())?;
        }
        Ok(())
    }

    /// Remove every entry of `other`. Nothing is removed if any entry is missing.
    pub fn subtract(&mut self, other: &Self) -> Result<()> {
        if let Some(missing) = other.pegs.iter().find(|p| !self.contains(p.peg_hash())) {
            return Err(PegsettleError::PegNotFound(missing.peg_hash().clone()));
        }
        for peg in &other.pegs {
            self.remove(peg.peg_hash())?;
        }
        Ok(())
    }

    /// Validate every entry.
    pub fn validate(&self) -> Result<()> {
        self.pegs.iter().try_for_each(Pegged::validate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.pegs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pegs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pegs.is_empty()
    }
}

impl FiatPegWallet {
    /// Sum of outstanding amounts across all fiat pegs. Fails rather than
    /// wrapping when the total leaves `i64`.
    pub fn balance(&self) -> Result<i64> {
        self.pegs.iter().try_fold(0_i64, |total, peg| {
            total
                .checked_add(peg.outstanding())
                .ok_or_else(|| PegsettleError::InvalidInput {
                    field: "fiat_peg_wallet",
                    reason: "balance overflows i64".into(),
                })
        })
    }

    /// Per-peg checks plus a representable balance.
    pub fn validate_amounts(&self) -> Result<()> {
        self.validate()?;
        self.balance().map(drop)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl AssetPeg {
    /// Unlocked, unrestricted asset peg.
    #[must_use]
    pub fn dummy(peg_hash: &[u8]) -> Self {
        Self {
            peg_hash: PegHash::new(peg_hash.to_vec()),
            document_hash: "doc".into(),
            asset_type: "sugar".into(),
            asset_quantity: 100,
            asset_price: 1000,
            quantity_unit: "MT".into(),
            moderated: false,
            locked: false,
            taker_address: None,
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl FiatPeg {
    #[must_use]
    pub fn dummy(peg_hash: &[u8], amount: i64) -> Self {
        Self {
            peg_hash: PegHash::new(peg_hash.to_vec()),
            transaction_id: "tx".into(),
            transaction_amount: amount,
            redeemed_amount: 0,
            owners: Vec::new(),
        }
    }
}
