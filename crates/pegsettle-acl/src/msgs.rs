//! Inbound ACL messages.

use serde::{Deserialize, Serialize};

use pegsettle_types::{Address, AclAccount, LedgerConfig, OrganizationId, Result, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineZone {
    pub from: Address,
    pub to: Address,
    pub zone_id: ZoneId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineOrganization {
    pub from: Address,
    pub to: Address,
    pub organization_id: OrganizationId,
    pub zone_id: ZoneId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineAcl {
    pub from: Address,
    pub acl_account: AclAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entries", rename_all = "snake_case")]
pub enum AclMsg {
    DefineZones(Vec<DefineZone>),
    DefineOrganizations(Vec<DefineOrganization>),
    DefineAcls(Vec<DefineAcl>),
}

impl AclMsg {
    /// Stateless checks run before any store access.
    pub fn validate_basic(&self, cfg: &LedgerConfig) -> Result<()> {
        match self {
            Self::DefineZones(entries) => {
                cfg.check_batch_len(entries.len())?;
                for e in entries {
                    e.from.ensure_valid()?;
                    e.to.ensure_valid()?;
                    e.zone_id.ensure_present()?;
                }
            }
            Self::DefineOrganizations(entries) => {
                cfg.check_batch_len(entries.len())?;
                for e in entries {
                    e.from.ensure_valid()?;
                    e.to.ensure_valid()?;
                    e.organization_id.ensure_present()?;
                    e.zone_id.ensure_present()?;
                }
            }
            Self::DefineAcls(entries) => {
                cfg.check_batch_len(entries.len())?;
                for e in entries {
                    e.from.ensure_valid()?;
                    e.acl_account.address.ensure_valid()?;
                    e.acl_account.zone_id.ensure_present()?;
                    e.acl_account.organization_id.ensure_present()?;
                }
            }
        }
        Ok(())
    }

    /// The `from` address of every entry.
    #[must_use]
    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::DefineZones(entries) => entries.iter().map(|e| e.from.clone()).collect(),
            Self::DefineOrganizations(entries) => entries.iter().map(|e| e.from.clone()).collect(),
            Self::DefineAcls(entries) => entries.iter().map(|e| e.from.clone()).collect(),
        }
    }
}
