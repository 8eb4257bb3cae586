//! ACL keeper: zone, organization, and account capability records.
//!
//! Authority flows down three tiers:
//!
//! 1. The **authority** address (set at genesis) defines zones.
//! 2. A **zone** address defines organizations inside its zone.
//! 3. The authority, the account's zone, or the account's organization
//!    defines ACL accounts.
//!
//! Every other keeper calls [`AclKeeper::require`] before mutating state.

use std::sync::Arc;

use pegsettle_store::{Codec, Context};
use pegsettle_types::{
    keys, Address, AclAccount, Capability, Event, Organization, OrganizationId, PegsettleError,
    Result, ZoneId,
};

#[derive(Debug, Clone)]
pub struct AclKeeper {
    codec: Arc<Codec>,
}

impl AclKeeper {
    #[must_use]
    pub fn new(codec: Arc<Codec>) -> Self {
        Self { codec }
    }

    // -----------------------------------------------------------------
    // Authority
    // -----------------------------------------------------------------

    pub fn authority(&self, ctx: &Context<'_>) -> Result<Option<Address>> {
        ctx.load(&self.codec, &keys::acl_authority_key())
    }

    pub fn set_authority(&self, ctx: &mut Context<'_>, authority: &Address) -> Result<()> {
        authority.ensure_valid()?;
        ctx.save(&self.codec, &keys::acl_authority_key(), authority)
    }

    // -----------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------

    /// Register (or replace) the address governing `zone_id`.
    /// Only the authority may do this.
    pub fn define_zone_address(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        zone_id: &ZoneId,
    ) -> Result<()> {
        to.ensure_valid()?;
        zone_id.ensure_present()?;
        let authority = self.authority(ctx)?.ok_or(PegsettleError::AuthorityNotSet)?;
        if &authority != from {
            tracing::warn!(from = %from, zone = %zone_id, "Zone definition denied: not the authority");
            return Err(PegsettleError::Unauthorized {
                from: from.clone(),
                action: "define zone",
            });
        }

        self.set_zone_address(ctx, zone_id, to)?;
        ctx.emit(
            Event::new("define_zone")
                .attr("zone_id", zone_id)
                .attr("zone_address", to),
        );
        tracing::info!(zone = %zone_id, address = %to, "Zone defined");
        Ok(())
    }

    /// Register (or replace) an organization. Only the zone's address may do this.
    pub fn define_organization_address(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        organization_id: &OrganizationId,
        zone_id: &ZoneId,
    ) -> Result<()> {
        to.ensure_valid()?;
        organization_id.ensure_present()?;
        zone_id.ensure_present()?;
        let zone_address = self.get_zone_details(ctx, zone_id)?;
        if &zone_address != from {
            tracing::warn!(from = %from, zone = %zone_id, "Organization definition denied: not the zone");
            return Err(PegsettleError::Unauthorized {
                from: from.clone(),
                action: "define organization",
            });
        }

        let organization = Organization {
            address: to.clone(),
            zone_id: zone_id.clone(),
        };
        self.set_organization(ctx, organization_id, &organization)?;
        ctx.emit(
            Event::new("define_organization")
                .attr("organization_id", organization_id)
                .attr("organization_address", to)
                .attr("zone_id", zone_id),
        );
        tracing::info!(organization = %organization_id, zone = %zone_id, address = %to, "Organization defined");
        Ok(())
    }

    /// Register (or replace) an account's capability record.
    pub fn define_acl_account(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        account: &AclAccount,
    ) -> Result<()> {
        account.address.ensure_valid()?;
        account.zone_id.ensure_present()?;
        account.organization_id.ensure_present()?;
        self.check_definer(ctx, from, account)?;

        self.set_acl_account(ctx, account)?;
        ctx.emit(
            Event::new("define_acl")
                .attr("acl_address", &account.address)
                .attr("zone_id", &account.zone_id)
                .attr("organization_id", &account.organization_id),
        );
        tracing::info!(
            address = %account.address,
            zone = %account.zone_id,
            organization = %account.organization_id,
            "ACL account defined"
        );
        Ok(())
    }

    fn check_definer(&self, ctx: &Context<'_>, from: &Address, account: &AclAccount) -> Result<()> {
        let zone_address = self.get_zone_details(ctx, &account.zone_id)?;
        let organization = self.get_organization_details(ctx, &account.organization_id)?;
        if organization.zone_id != account.zone_id {
            return Err(PegsettleError::InvalidInput {
                field: "organization_id",
                reason: format!(
                    "organization {} belongs to zone {}, not {}",
                    account.organization_id, organization.zone_id, account.zone_id
                ),
            });
        }

        let is_authority = self.authority(ctx)?.as_ref() == Some(from);
        if is_authority || &zone_address == from || &organization.address == from {
            return Ok(());
        }
        tracing::warn!(from = %from, target = %account.address, "ACL definition denied");
        Err(PegsettleError::Unauthorized {
            from: from.clone(),
            action: "define acl account",
        })
    }

    // -----------------------------------------------------------------
    // Raw setters (genesis and definitions)
    // -----------------------------------------------------------------

    pub(crate) fn set_zone_address(&self, ctx: &mut Context<'_>, zone_id: &ZoneId, address: &Address) -> Result<()> {
        ctx.save(&self.codec, &keys::zone_key(zone_id), address)
    }

    pub(crate) fn set_organization(
        &self,
        ctx: &mut Context<'_>,
        organization_id: &OrganizationId,
        organization: &Organization,
    ) -> Result<()> {
        ctx.save(&self.codec, &keys::organization_key(organization_id), organization)
    }

    pub(crate) fn set_acl_account(&self, ctx: &mut Context<'_>, account: &AclAccount) -> Result<()> {
        ctx.save(&self.codec, &keys::acl_account_key(&account.address), account)
    }

    // -----------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------

    pub fn get_zone_details(&self, ctx: &Context<'_>, zone_id: &ZoneId) -> Result<Address> {
        ctx.load(&self.codec, &keys::zone_key(zone_id))?
            .ok_or_else(|| PegsettleError::ZoneNotFound(zone_id.clone()))
    }

    pub fn get_organization_details(
        &self,
        ctx: &Context<'_>,
        organization_id: &OrganizationId,
    ) -> Result<Organization> {
        ctx.load(&self.codec, &keys::organization_key(organization_id))?
            .ok_or_else(|| PegsettleError::OrganizationNotFound(organization_id.clone()))
    }

    pub fn get_account_acl_details(&self, ctx: &Context<'_>, address: &Address) -> Result<AclAccount> {
        ctx.load(&self.codec, &keys::acl_account_key(address))?
            .ok_or_else(|| PegsettleError::AclAccountNotFound(address.clone()))
    }

    /// Load `to`'s account, succeeding only if `from` governs its zone.
    pub fn check_zone_and_get_acl(&self, ctx: &Context<'_>, from: &Address, to: &Address) -> Result<AclAccount> {
        let account = self.get_account_acl_details(ctx, to)?;
        let zone_address = self.get_zone_details(ctx, &account.zone_id)?;
        if &zone_address != from {
            return Err(PegsettleError::Unauthorized {
                from: from.clone(),
                action: "act for this zone",
            });
        }
        Ok(account)
    }

    /// Load `to`'s account, succeeding only if `from` is its organization.
    pub fn check_organization_and_get_acl(
        &self,
        ctx: &Context<'_>,
        from: &Address,
        to: &Address,
    ) -> Result<AclAccount> {
        let account = self.get_account_acl_details(ctx, to)?;
        let organization = self.get_organization_details(ctx, &account.organization_id)?;
        if &organization.address != from {
            return Err(PegsettleError::Unauthorized {
                from: from.clone(),
                action: "act for this organization",
            });
        }
        Ok(account)
    }

    /// Gate an action on `address` holding `capability`. An address with no
    /// ACL account holds nothing.
    pub fn require(&self, ctx: &Context<'_>, address: &Address, capability: Capability) -> Result<AclAccount> {
        let denied = || {
            tracing::warn!(address = %address, capability = %capability, "Capability denied");
            PegsettleError::CapabilityDenied {
                address: address.clone(),
                capability,
            }
        };
        match ctx.load::<AclAccount>(&self.codec, &keys::acl_account_key(address))? {
            Some(account) if account.allows(capability) => Ok(account),
            _ => Err(denied()),
        }
    }

    // -----------------------------------------------------------------
    // Enumeration
    // -----------------------------------------------------------------

    pub fn zones(&self, ctx: &Context<'_>) -> Result<Vec<(ZoneId, Address)>> {
        Ok(ctx
            .load_all(&self.codec, &[keys::ZONE_PREFIX])?
            .into_iter()
            .map(|(key, address)| (ZoneId::new(keys::key_suffix(&key)), address))
            .collect())
    }

    pub fn organizations(&self, ctx: &Context<'_>) -> Result<Vec<(OrganizationId, Organization)>> {
        Ok(ctx
            .load_all(&self.codec, &[keys::ORGANIZATION_PREFIX])?
            .into_iter()
            .map(|(key, org)| (OrganizationId::new(keys::key_suffix(&key)), org))
            .collect())
    }

    pub fn organizations_by_zone(
        &self,
        ctx: &Context<'_>,
        zone_id: &ZoneId,
    ) -> Result<Vec<(OrganizationId, Organization)>> {
        let mut orgs = self.organizations(ctx)?;
        orgs.retain(|(_, org)| &org.zone_id == zone_id);
        Ok(orgs)
    }

    pub fn acl_accounts(&self, ctx: &Context<'_>) -> Result<Vec<AclAccount>> {
        Ok(ctx
            .load_all(&self.codec, &[keys::ACL_ACCOUNT_PREFIX])?
            .into_iter()
            .map(|(_, account)| account)
            .collect())
    }
}
