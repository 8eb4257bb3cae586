//! ACL genesis import / export.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use pegsettle_store::Context;
use pegsettle_types::{Address, AclAccount, Organization, OrganizationId, PegsettleError, Result, ZoneId};

use crate::keeper::AclKeeper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub zone_id: ZoneId,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationEntry {
    pub organization_id: OrganizationId,
    pub organization: Organization,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclGenesis {
    pub authority: Option<Address>,
    pub zones: Vec<ZoneEntry>,
    pub organizations: Vec<OrganizationEntry>,
    pub accounts: Vec<AclAccount>,
}

impl AclGenesis {
    /// Every organization and account must reference a zone defined here,
    /// and every account an organization defined here. All addresses must
    /// be well formed.
    pub fn validate(&self) -> Result<()> {
        if let Some(authority) = &self.authority {
            authority.ensure_valid()?;
        }
        for zone in &self.zones {
            zone.address.ensure_valid()?;
        }
        let zones: HashSet<&ZoneId> = self.zones.iter().map(|z| &z.zone_id).collect();
        let orgs: HashSet<&OrganizationId> =
            self.organizations.iter().map(|o| &o.organization_id).collect();

        for org in &self.organizations {
            org.organization.address.ensure_valid()?;
            if !zones.contains(&org.organization.zone_id) {
                return Err(PegsettleError::ZoneNotFound(org.organization.zone_id.clone()));
            }
        }
        for account in &self.accounts {
            account.address.ensure_valid()?;
            if !zones.contains(&account.zone_id) {
                return Err(PegsettleError::ZoneNotFound(account.zone_id.clone()));
            }
            if !orgs.contains(&account.organization_id) {
                return Err(PegsettleError::OrganizationNotFound(account.organization_id.clone()));
            }
        }
        Ok(())
    }
}

/// Write genesis records directly, bypassing definition authorization.
pub fn init_genesis(keeper: &AclKeeper, ctx: &mut Context<'_>, genesis: &AclGenesis) -> Result<()> {
    genesis.validate()?;
    if let Some(authority) = &genesis.authority {
        keeper.set_authority(ctx, authority)?;
    }
    for zone in &genesis.zones {
        keeper.set_zone_address(ctx, &zone.zone_id, &zone.address)?;
    }
    for org in &genesis.organizations {
        keeper.set_organization(ctx, &org.organization_id, &org.organization)?;
    }
    for account in &genesis.accounts {
        keeper.set_acl_account(ctx, account)?;
    }
    tracing::info!(
        zones = genesis.zones.len(),
        organizations = genesis.organizations.len(),
        accounts = genesis.accounts.len(),
        "ACL genesis loaded"
    );
    Ok(())
}

pub fn export_genesis(keeper: &AclKeeper, ctx: &Context<'_>) -> Result<AclGenesis> {
    Ok(AclGenesis {
        authority: keeper.authority(ctx)?,
        zones: keeper
            .zones(ctx)?
            .into_iter()
            .map(|(zone_id, address)| ZoneEntry { zone_id, address })
            .collect(),
        organizations: keeper
            .organizations(ctx)?
            .into_iter()
            .map(|(organization_id, organization)| OrganizationEntry {
                organization_id,
                organization,
            })
            .collect(),
        accounts: keeper.acl_accounts(ctx)?,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pegsettle_store::{Codec, MemStore};
    use pegsettle_types::{Acl, BlockHeader};

    fn sample() -> AclGenesis {
        AclGenesis {
            authority: Some(Address::new(vec![0xa0; 20])),
            zones: vec![ZoneEntry {
                zone_id: ZoneId::new(vec![1]),
                address: Address::new(vec![0xb0; 20]),
            }],
            organizations: vec![OrganizationEntry {
                organization_id: OrganizationId::new(vec![2]),
                organization: Organization {
                    address: Address::new(vec![0xc0; 20]),
                    zone_id: ZoneId::new(vec![1]),
                },
            }],
            accounts: vec![AclAccount {
                address: Address::new(vec![0x01; 20]),
                zone_id: ZoneId::new(vec![1]),
                organization_id: OrganizationId::new(vec![2]),
                acl: Acl::all(),
            }],
        }
    }

    #[test]
    fn export_matches_import() {
        let keeper = AclKeeper::new(Arc::new(Codec::default()));
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::at_height(0));
        init_genesis(&keeper, &mut ctx, &sample()).unwrap();
        assert_eq!(export_genesis(&keeper, &ctx).unwrap(), sample());
    }

    #[test]
    fn dangling_organization_reference_rejected() {
        let mut g = sample();
        g.accounts[0].organization_id = OrganizationId::new(vec![9]);
        assert!(matches!(g.validate().unwrap_err(), PegsettleError::OrganizationNotFound(_)));
    }

    #[test]
    fn short_zone_address_rejected() {
        let mut g = sample();
        g.zones[0].address = Address::new(vec![0xb0; 4]);
        let err = g.validate().unwrap_err();
        assert!(matches!(err, PegsettleError::InvalidInput { field: "address", .. }));
    }

    #[test]
    fn empty_genesis_is_valid() {
        AclGenesis::default().validate().unwrap();
    }
}
