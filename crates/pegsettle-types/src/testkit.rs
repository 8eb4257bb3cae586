//! Deterministic signing identities for tests.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::{rngs::StdRng, SeedableRng};

use crate::{Address, InMemoryDirectory, Negotiation, Signature};

/// A keypair whose address is the first 20 bytes of its public key.
#[derive(Debug, Clone)]
pub struct TestSigner {
    key: SigningKey,
}

impl TestSigner {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            key: SigningKey::generate(&mut rng),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        Address::new(self.key.verifying_key().as_bytes()[..20].to_vec())
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    #[must_use]
    pub fn sign(&self, msg: &[u8]) -> Signature {
        Signature::new(self.key.sign(msg).to_bytes().to_vec())
    }

    /// Sign the canonical terms of `negotiation`.
    #[must_use]
    pub fn sign_negotiation(&self, negotiation: &Negotiation) -> Signature {
        self.sign(&negotiation.sign_body().signing_payload())
    }

    /// Register this signer's key in `directory`.
    pub fn register(&self, directory: &mut InMemoryDirectory) {
        directory.register_key(self.address(), self.verifying_key());
    }
}
