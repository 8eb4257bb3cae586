//! Read-only ACL queries returning pretty JSON, or `None` when absent.

use serde::{Deserialize, Serialize};

use pegsettle_store::Context;
use pegsettle_types::{Address, OrganizationId, PegsettleError, Result, ZoneId};

use crate::keeper::AclKeeper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", content = "id", rename_all = "snake_case")]
pub enum AclQuery {
    Zone(ZoneId),
    Organization(OrganizationId),
    AclAccount(Address),
}

pub fn query_acl(keeper: &AclKeeper, ctx: &Context<'_>, query: &AclQuery) -> Result<Option<Vec<u8>>> {
    let found = match query {
        AclQuery::Zone(id) => absent_as_none(keeper.get_zone_details(ctx, id))?.map(|a| to_json(&a)),
        AclQuery::Organization(id) => {
            absent_as_none(keeper.get_organization_details(ctx, id))?.map(|o| to_json(&o))
        }
        AclQuery::AclAccount(address) => {
            absent_as_none(keeper.get_account_acl_details(ctx, address))?.map(|a| to_json(&a))
        }
    };
    found.transpose()
}

fn absent_as_none<T>(res: Result<T>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(
            PegsettleError::ZoneNotFound(_)
            | PegsettleError::OrganizationNotFound(_)
            | PegsettleError::AclAccountNotFound(_),
        ) => Ok(None),
        Err(e) => Err(e),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}
