//! Block metadata supplied by the ledger runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Height and time of the block a transaction executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: i64,
    pub time: DateTime<Utc>,
}

impl BlockHeader {
    #[must_use]
    pub fn new(height: i64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    /// Header at `height` with the Unix epoch as its time.
    #[must_use]
    pub fn at_height(height: i64) -> Self {
        Self {
            height,
            time: DateTime::<Utc>::default(),
        }
    }
}
