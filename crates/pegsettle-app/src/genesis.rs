//! Whole-ledger genesis document.

use serde::{Deserialize, Serialize};

use pegsettle_acl::AclGenesis;
use pegsettle_trade::TradeGenesis;
use pegsettle_types::{PegsettleError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisState {
    pub acl: AclGenesis,
    pub trade: TradeGenesis,
}

impl GenesisState {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| PegsettleError::Configuration(format!("genesis: {e}")))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.acl.validate()?;
        self.trade.validate()
    }
}
