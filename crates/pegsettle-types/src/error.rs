//! Error types for pegsettle.
//!
//! All errors use the `PS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: ACL errors
//! - 2xx: Negotiation errors
//! - 3xx: Escrow order errors
//! - 4xx: Reputation errors
//! - 5xx: Input validation errors
//! - 6xx: Signature errors
//! - 9xx: General / internal errors
//!
//! Every variant maps onto one [`ErrorKind`], the coarse taxonomy callers
//! branch on.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Address, Capability, NegotiationId, OrganizationId, Party, PegHash, ZoneId};

/// Coarse error classes returned to the ledger runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authorization,
    NotFound,
    StateConflict,
    Validation,
    Signature,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::StateConflict => "state_conflict",
            Self::Validation => "validation",
            Self::Signature => "signature",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Central error enum for all pegsettle operations.
#[derive(Debug, Error)]
pub enum PegsettleError {
    // =================================================================
    // ACL Errors (1xx)
    // =================================================================
    /// The account lacks the capability required for the action.
    #[error("PS_ERR_100: {address} lacks capability {capability}")]
    CapabilityDenied {
        address: Address,
        capability: Capability,
    },

    /// An ACL definition was not issued by the governing zone or organization.
    #[error("PS_ERR_101: {from} is not authorized to {action}")]
    Unauthorized { from: Address, action: &'static str },

    #[error("PS_ERR_102: Zone not found: {0}")]
    ZoneNotFound(ZoneId),

    #[error("PS_ERR_103: Organization not found: {0}")]
    OrganizationNotFound(OrganizationId),

    #[error("PS_ERR_104: ACL account not found: {0}")]
    AclAccountNotFound(Address),

    /// The ACL authority has not been set at genesis.
    #[error("PS_ERR_105: ACL authority not initialized")]
    AuthorityNotSet,

    /// The asset peg is reserved for a different taker.
    #[error("PS_ERR_106: Peg {peg_hash} is reserved for another taker, not {buyer}")]
    TakerMismatch { peg_hash: PegHash, buyer: Address },

    // =================================================================
    // Negotiation Errors (2xx)
    // =================================================================
    #[error("PS_ERR_200: Negotiation not found: {0}")]
    NegotiationNotFound(NegotiationId),

    /// Bid change attempted after at least one side signed.
    #[error("PS_ERR_201: Already signed, cannot change negotiation {0}")]
    AlreadySigned(NegotiationId),

    /// Both signatures are already present.
    #[error("PS_ERR_202: Signatures already exist for negotiation {0}")]
    SignaturesAlreadyExist(NegotiationId),

    /// The confirming side submitted a bid different from the stored one.
    #[error("PS_ERR_203: Buyer and seller must confirm the same bid: stored {stored}, submitted {submitted}")]
    BidMismatch { stored: i64, submitted: i64 },

    /// The negotiation is not fully signed.
    #[error("PS_ERR_204: Negotiation {0} is not confirmed")]
    NegotiationNotConfirmed(NegotiationId),

    /// The negotiation's validity window has passed.
    #[error("PS_ERR_205: Negotiation {id} expired at height {expired_at}")]
    NegotiationExpired { id: NegotiationId, expired_at: i64 },

    // =================================================================
    // Escrow Order Errors (3xx)
    // =================================================================
    #[error("PS_ERR_300: Order not found: {0}")]
    OrderNotFound(NegotiationId),

    /// The peg is already held in the target wallet.
    #[error("PS_ERR_301: Peg already in wallet: {0}")]
    DuplicatePeg(PegHash),

    /// The peg is not held in the wallet being debited.
    #[error("PS_ERR_302: Peg not in wallet: {0}")]
    PegNotFound(PegHash),

    /// A proof-of-completion hash can only be attached once.
    #[error("PS_ERR_303: {proof} proof hash already set for order {id}")]
    ProofAlreadySet { id: NegotiationId, proof: &'static str },

    /// The asset peg is locked and cannot move into escrow.
    #[error("PS_ERR_304: Asset peg is locked: {0}")]
    AssetLocked(PegHash),

    // =================================================================
    // Reputation Errors (4xx)
    // =================================================================
    /// Feedback submitted before both completion proofs were recorded.
    #[error("PS_ERR_400: Transaction not completed, cannot give feedback for {0}")]
    TransactionNotCompleted(NegotiationId),

    #[error("PS_ERR_401: Feedback already given by {rater} for peg {peg_hash}")]
    DuplicateFeedback { rater: Address, peg_hash: PegHash },

    // =================================================================
    // Validation Errors (5xx)
    // =================================================================
    #[error("PS_ERR_500: Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("PS_ERR_501: Score {score} outside [{min}, {max}]")]
    ScoreOutOfRange { score: i64, min: i64, max: i64 },

    #[error("PS_ERR_502: Message must carry between 1 and {max} entries, got {got}")]
    BatchSize { got: usize, max: usize },

    // =================================================================
    // Signature Errors (6xx)
    // =================================================================
    /// The signature did not verify against the signer's registered key.
    #[error("PS_ERR_600: {party} signature verification failed")]
    SignatureInvalid { party: Party },

    /// The signature bytes are not a well-formed ed25519 signature.
    #[error("PS_ERR_601: Malformed {party} signature")]
    SignatureMalformed { party: Party },

    /// No public key is registered for the address.
    #[error("PS_ERR_602: No public key registered for {0}")]
    PublicKeyNotFound(Address),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    #[error("PS_ERR_900: Internal error: {0}")]
    Internal(String),

    #[error("PS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    #[error("PS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    #[error("PS_ERR_903: I/O error: {0}")]
    Io(String),
}

impl PegsettleError {
    /// Map onto the coarse taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapabilityDenied { .. }
            | Self::Unauthorized { .. }
            | Self::AuthorityNotSet
            | Self::TakerMismatch { .. } => ErrorKind::Authorization,

            Self::ZoneNotFound(_)
            | Self::OrganizationNotFound(_)
            | Self::AclAccountNotFound(_)
            | Self::NegotiationNotFound(_)
            | Self::OrderNotFound(_)
            | Self::PegNotFound(_)
            | Self::PublicKeyNotFound(_) => ErrorKind::NotFound,

            Self::AlreadySigned(_)
            | Self::SignaturesAlreadyExist(_)
            | Self::BidMismatch { .. }
            | Self::NegotiationNotConfirmed(_)
            | Self::NegotiationExpired { .. }
            | Self::DuplicatePeg(_)
            | Self::ProofAlreadySet { .. }
            | Self::AssetLocked(_)
            | Self::TransactionNotCompleted(_)
            | Self::DuplicateFeedback { .. } => ErrorKind::StateConflict,

            Self::InvalidInput { .. } | Self::ScoreOutOfRange { .. } | Self::BatchSize { .. } => {
                ErrorKind::Validation
            }

            Self::SignatureInvalid { .. } | Self::SignatureMalformed { .. } => ErrorKind::Signature,

            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PegsettleError>;

impl From<std::io::Error> for PegsettleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PegsettleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
