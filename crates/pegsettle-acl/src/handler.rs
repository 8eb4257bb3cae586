//! Routes ACL messages to the keeper.

use pegsettle_store::{run_batch, Context};
use pegsettle_types::{LedgerConfig, Result};

use crate::keeper::AclKeeper;
use crate::msgs::AclMsg;

pub fn handle_acl_msg(keeper: &AclKeeper, ctx: &mut Context<'_>, cfg: &LedgerConfig, msg: &AclMsg) -> Result<()> {
    msg.validate_basic(cfg)?;
    match msg {
        AclMsg::DefineZones(entries) => run_batch(ctx, cfg.batch_mode, entries, |c, e| {
            keeper.define_zone_address(c, &e.from, &e.to, &e.zone_id)
        }),
        AclMsg::DefineOrganizations(entries) => run_batch(ctx, cfg.batch_mode, entries, |c, e| {
            keeper.define_organization_address(c, &e.from, &e.to, &e.organization_id, &e.zone_id)
        }),
        AclMsg::DefineAcls(entries) => run_batch(ctx, cfg.batch_mode, entries, |c, e| {
            keeper.define_acl_account(c, &e.from, &e.acl_account)
        }),
    }
}
