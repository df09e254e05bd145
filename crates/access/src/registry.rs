//! Role registry

use flowbank_core::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::error::AccessError;

/// A capability
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Keeper,
    Reporter,
}

/// Typed result of a successful role check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    caller: Address,
    role: Role,
    as_admin: bool,
}

impl Authorization {
    pub fn caller(&self) -> &Address {
        &self.caller
    }

    /// Role that was required
    pub fn role(&self) -> Role {
        self.role
    }

    /// True when the check passed only through admin rights
    pub fn as_admin(&self) -> bool {
        self.as_admin
    }
}

/// Outcome of an ownership transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTransfer {
    pub previous: Address,
    pub new_owner: Address,
    /// Roles the new owner held before and lost to keep the sets disjoint
    pub revoked: Vec<Role>,
}

/// Role memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    owner: Address,
    keepers: BTreeSet<Address>,
    reporters: BTreeSet<Address>,
}

impl RoleRegistry {
    /// Registry with `owner` as the only admin and no keepers or reporters
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            keepers: BTreeSet::new(),
            reporters: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Exact membership (admin is *not* treated as a member of other roles)
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        match role {
            Role::Admin => self.owner == *account,
            Role::Keeper => self.keepers.contains(account),
            Role::Reporter => self.reporters.contains(account),
        }
    }

    /// The role `account` holds, if any
    pub fn role_of(&self, account: &Address) -> Option<Role> {
        [Role::Admin, Role::Keeper, Role::Reporter]
            .into_iter()
            .find(|role| self.has_role(*role, account))
    }

    /// Check that `caller` may act as `role`. Admin passes every check.
    pub fn authorize(&self, caller: &Address, role: Role) -> Result<Authorization, AccessError> {
        if self.has_role(role, caller) {
            return Ok(Authorization {
                caller: caller.clone(),
                role,
                as_admin: role == Role::Admin,
            });
        }

        if self.owner == *caller {
            return Ok(Authorization {
                caller: caller.clone(),
                role,
                as_admin: true,
            });
        }

        warn!(caller = %caller, role = %role, "Role check failed");
        Err(AccessError::Unauthorized {
            caller: caller.clone(),
            role,
        })
    }

    /// Add `account` to `role`. Returns false if it was already a member.
    pub fn grant(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<bool, AccessError> {
        self.authorize(caller, Role::Admin)?;

        if let Some(held) = self.role_of(account) {
            if held == role {
                return Ok(false);
            }
            return Err(AccessError::RoleConflict {
                account: account.clone(),
                held,
                requested: role,
            });
        }

        let set = self.set_mut(role)?;
        set.insert(account.clone());
        debug!(account = %account, role = %role, "Role granted");
        Ok(true)
    }

    /// Remove `account` from `role`. Returns false if it was not a member.
    pub fn revoke(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<bool, AccessError> {
        self.authorize(caller, Role::Admin)?;

        let removed = self.set_mut(role)?.remove(account);
        if removed {
            debug!(account = %account, role = %role, "Role revoked");
        }
        Ok(removed)
    }

    /// Move the admin role to `new_owner` in one step.
    ///
    /// The new owner drops any keeper/reporter membership it held.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<OwnershipTransfer, AccessError> {
        self.authorize(caller, Role::Admin)?;

        let mut revoked = Vec::new();
        if self.keepers.remove(new_owner) {
            revoked.push(Role::Keeper);
        }
        if self.reporters.remove(new_owner) {
            revoked.push(Role::Reporter);
        }

        let previous = std::mem::replace(&mut self.owner, new_owner.clone());
        debug!(previous = %previous, new_owner = %new_owner, "Ownership transferred");

        Ok(OwnershipTransfer {
            previous,
            new_owner: new_owner.clone(),
            revoked,
        })
    }

    /// Members of a role, in address order
    pub fn members(&self, role: Role) -> Vec<Address> {
        match role {
            Role::Admin => vec![self.owner.clone()],
            Role::Keeper => self.keepers.iter().cloned().collect(),
            Role::Reporter => self.reporters.iter().cloned().collect(),
        }
    }

    pub fn member_count(&self, role: Role) -> usize {
        match role {
            Role::Admin => 1,
            Role::Keeper => self.keepers.len(),
            Role::Reporter => self.reporters.len(),
        }
    }

    fn set_mut(&mut self, role: Role) -> Result<&mut BTreeSet<Address>, AccessError> {
        match role {
            Role::Admin => Err(AccessError::AdminNotGrantable),
            Role::Keeper => Ok(&mut self.keepers),
            Role::Reporter => Ok(&mut self.reporters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn registry() -> RoleRegistry {
        RoleRegistry::new(addr("owner"))
    }

    #[test]
    fn test_admin_passes_every_role() {
        let registry = registry();
        for role in Role::iter() {
            let auth = registry.authorize(&addr("owner"), role).unwrap();
            assert!(auth.as_admin());
            assert_eq!(auth.role(), role);
        }
    }

    #[test]
    fn test_stranger_is_unauthorized() {
        let registry = registry();
        assert_eq!(
            registry.authorize(&addr("mallory"), Role::Keeper),
            Err(AccessError::Unauthorized {
                caller: addr("mallory"),
                role: Role::Keeper,
            })
        );
    }

    #[test]
    fn test_keeper_cannot_self_escalate() {
        let mut registry = registry();
        registry.grant(&addr("owner"), Role::Keeper, &addr("k1")).unwrap();

        let result = registry.grant(&addr("k1"), Role::Reporter, &addr("k1"));
        assert!(matches!(result, Err(AccessError::Unauthorized { .. })));
        let result = registry.grant(&addr("k1"), Role::Keeper, &addr("k2"));
        assert!(matches!(result, Err(AccessError::Unauthorized { .. })));
        assert!(registry.authorize(&addr("k1"), Role::Admin).is_err());
    }

    #[test]
    fn test_roles_are_disjoint() {
        let mut registry = registry();
        registry.grant(&addr("owner"), Role::Keeper, &addr("k1")).unwrap();

        assert_eq!(
            registry.grant(&addr("owner"), Role::Reporter, &addr("k1")),
            Err(AccessError::RoleConflict {
                account: addr("k1"),
                held: Role::Keeper,
                requested: Role::Reporter,
            })
        );
        assert!(registry.grant(&addr("owner"), Role::Keeper, &addr("owner")).is_err());
        assert_eq!(
            registry.grant(&addr("owner"), Role::Admin, &addr("x")),
            Err(AccessError::AdminNotGrantable)
        );
    }

    #[test]
    fn test_grant_and_revoke_are_idempotent() {
        let mut registry = registry();
        assert_eq!(registry.grant(&addr("owner"), Role::Reporter, &addr("r1")), Ok(true));
        assert_eq!(registry.grant(&addr("owner"), Role::Reporter, &addr("r1")), Ok(false));
        assert_eq!(registry.member_count(Role::Reporter), 1);

        assert_eq!(registry.revoke(&addr("owner"), Role::Reporter, &addr("r1")), Ok(true));
        assert_eq!(registry.revoke(&addr("owner"), Role::Reporter, &addr("r1")), Ok(false));
        assert_eq!(registry.member_count(Role::Reporter), 0);
    }

    #[test]
    fn test_members_enumeration() {
        let mut registry = registry();
        registry.grant(&addr("owner"), Role::Keeper, &addr("k2")).unwrap();
        registry.grant(&addr("owner"), Role::Keeper, &addr("k1")).unwrap();

        assert_eq!(registry.members(Role::Keeper), vec![addr("k1"), addr("k2")]);
        assert_eq!(registry.members(Role::Admin), vec![addr("owner")]);
        assert_eq!(registry.member_count(Role::Admin), 1);
    }

    #[test]
    fn test_transfer_ownership_moves_admin() {
        let mut registry = registry();
        registry.grant(&addr("owner"), Role::Keeper, &addr("k1")).unwrap();

        let transfer = registry
            .transfer_ownership(&addr("owner"), &addr("k1"))
            .unwrap();
        assert_eq!(transfer.previous, addr("owner"));
        assert_eq!(transfer.revoked, vec![Role::Keeper]);

        assert_eq!(registry.owner(), &addr("k1"));
        assert!(!registry.has_role(Role::Keeper, &addr("k1")));
        assert!(registry.authorize(&addr("owner"), Role::Admin).is_err());
        assert!(registry.authorize(&addr("k1"), Role::Admin).is_ok());
    }

    #[test]
    fn test_only_admin_transfers_ownership() {
        let mut registry = registry();
        let result = registry.transfer_ownership(&addr("mallory"), &addr("mallory"));
        assert!(matches!(result, Err(AccessError::Unauthorized { .. })));
        assert_eq!(registry.owner(), &addr("owner"));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("keeper".parse::<Role>().unwrap(), Role::Keeper);
        assert_eq!(Role::Reporter.to_string(), "reporter");
    }
}
