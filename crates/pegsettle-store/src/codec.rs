//! Length-prefixed record codec.
//!
//! Record layout: `[u32 big-endian body length][serde_json body]`.
//! One [`Codec`] is built at startup and shared by every keeper.

use serde::{de::DeserializeOwned, Serialize};

use pegsettle_types::{constants::RECORD_LENGTH_PREFIX, PegsettleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    max_record_bytes: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(pegsettle_types::constants::DEFAULT_MAX_RECORD_BYTES)
    }
}

impl Codec {
    #[must_use]
    pub fn new(max_record_bytes: usize) -> Self {
        Self { max_record_bytes }
    }

    #[must_use]
    pub fn max_record_bytes(&self) -> usize {
        self.max_record_bytes
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(value)?;
        let total = RECORD_LENGTH_PREFIX + body.len();
        if total > self.max_record_bytes {
            return Err(PegsettleError::Serialization(format!(
                "record of {total} bytes exceeds limit {}",
                self.max_record_bytes
            )));
        }
        let len = u32::try_from(body.len())
            .map_err(|_| PegsettleError::Serialization("record body too large".into()))?;
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.len() > self.max_record_bytes {
            return Err(PegsettleError::Serialization(format!(
                "record of {} bytes exceeds limit {}",
                bytes.len(),
                self.max_record_bytes
            )));
        }
        let (prefix, body) = bytes
            .split_first_chunk::<RECORD_LENGTH_PREFIX>()
            .ok_or_else(|| PegsettleError::Serialization("record shorter than length prefix".into()))?;
        let declared = u32::from_be_bytes(*prefix) as usize;
        if declared != body.len() {
            return Err(PegsettleError::Serialization(format!(
                "record length prefix {declared} does not match body of {} bytes",
                body.len()
            )));
        }
        Ok(serde_json::from_slice(body)?)
    }
}
