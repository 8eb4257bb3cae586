//! System-wide constants for pegsettle.

/// Byte length of every account address.
///
/// Fixed so that `buyer ∥ seller ∥ peg_hash` splits back into exactly one
/// triple.
pub const ADDRESS_LEN: usize = 20;

/// Domain separator for negotiation signatures.
pub const NEGOTIATION_SIGN_DOMAIN: &[u8] = b"pegsettle:negotiation:v1:";

/// Domain separator for the ledger state digest.
pub const STATE_DIGEST_DOMAIN: &[u8] = b"pegsettle:state:v1:";

/// Decimal places kept on the aggregate rating.
pub const RATING_DECIMAL_PLACES: u32 = 2;

/// Default lowest accepted feedback score.
pub const DEFAULT_MIN_FEEDBACK_SCORE: i64 = 0;

/// Default highest accepted feedback score.
pub const DEFAULT_MAX_FEEDBACK_SCORE: i64 = 100;

/// Default cap on entries per batched message.
pub const DEFAULT_MAX_BATCH_ENTRIES: usize = 64;

/// Default cap on one encoded store record (1 MiB).
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1 << 20;

/// Width of the length prefix on encoded records.
pub const RECORD_LENGTH_PREFIX: usize = 4;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";
