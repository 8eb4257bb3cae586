//! Shared fixtures for unit tests.

use std::sync::Arc;

use pegsettle_acl::{init_genesis, AclGenesis, AclKeeper, OrganizationEntry, ZoneEntry};
use pegsettle_store::{Codec, Context};
use pegsettle_types::{Acl, AclAccount, Address, Organization, OrganizationId, ZoneId};

pub const BUYER: u8 = 0x0b;
pub const SELLER: u8 = 0x05;
pub const AUTHORITY: u8 = 0xa0;

pub fn addr(b: u8) -> Address {
    Address::new(vec![b; 20])
}

/// One zone, one organization, and ACL accounts for the buyer and seller.
pub fn acl_fixture(ctx: &mut Context<'_>, buyer: Acl, seller: Acl) -> AclKeeper {
    acl_fixture_for(ctx, &addr(BUYER), buyer, &addr(SELLER), seller)
}

pub fn acl_fixture_for(
    ctx: &mut Context<'_>,
    buyer: &Address,
    buyer_acl: Acl,
    seller: &Address,
    seller_acl: Acl,
) -> AclKeeper {
    let keeper = AclKeeper::new(Arc::new(Codec::default()));
    let zone_id = ZoneId::new(vec![1]);
    let organization_id = OrganizationId::new(vec![2]);
    let account = |address: Address, acl: Acl| AclAccount {
        address,
        zone_id: zone_id.clone(),
        organization_id: organization_id.clone(),
        acl,
    };
    let genesis = AclGenesis {
        authority: Some(addr(AUTHORITY)),
        zones: vec![ZoneEntry {
            zone_id: zone_id.clone(),
            address: addr(0xb0),
        }],
        organizations: vec![OrganizationEntry {
            organization_id: organization_id.clone(),
            organization: Organization {
                address: addr(0xc0),
                zone_id: zone_id.clone(),
            },
        }],
        accounts: vec![account(buyer.clone(), buyer_acl), account(seller.clone(), seller_acl)],
    };
    init_genesis(&keeper, ctx, &genesis).expect("acl genesis");
    keeper
}
