//! Account directory: the external collaborator that owns public keys and
//! account-side wallets.

use std::collections::HashMap;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::{Address, AssetPegWallet, FiatPegWallet, PegsettleError, Result};

/// Resolves the public key currently registered for an address.
pub trait PublicKeyResolver: Send + Sync {
    fn resolve_public_key(&self, address: &Address) -> Result<VerifyingKey>;
}

/// Account-side peg holdings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWallets {
    pub asset_peg_wallet: AssetPegWallet,
    pub fiat_peg_wallet: FiatPegWallet,
}

/// Public keys plus account-side wallets.
pub trait AccountDirectory: PublicKeyResolver {
    fn account_wallets(&self, address: &Address) -> Result<AccountWallets>;
}

/// Map-backed directory for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    keys: HashMap<Address, VerifyingKey>,
    wallets: HashMap<Address, AccountWallets>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_key(&mut self, address: Address, key: VerifyingKey) {
        self.keys.insert(address, key);
    }

    pub fn set_wallets(&mut self, address: Address, wallets: AccountWallets) {
        self.wallets.insert(address, wallets);
    }
}

impl PublicKeyResolver for InMemoryDirectory {
    fn resolve_public_key(&self, address: &Address) -> Result<VerifyingKey> {
        self.keys
            .get(address)
            .copied()
            .ok_or_else(|| PegsettleError::PublicKeyNotFound(address.clone()))
    }
}

impl AccountDirectory for InMemoryDirectory {
    /// Unknown addresses hold empty wallets.
    fn account_wallets(&self, address: &Address) -> Result<AccountWallets> {
        Ok(self.wallets.get(address).cloned().unwrap_or_default())
    }
}
