//! Well-known role names and the caller identity handed to the workflow.
//!
//! Role names must match the `role` claim issued in access tokens.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MERCHANT: &str = "merchant";

/// The authenticated caller of a listing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: DbId,
    pub role: String,
}

impl Actor {
    pub fn merchant(user_id: DbId) -> Self {
        Self {
            user_id,
            role: ROLE_MERCHANT.to_string(),
        }
    }

    pub fn admin(user_id: DbId) -> Self {
        Self {
            user_id,
            role: ROLE_ADMIN.to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Who may invoke a given listing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Only the merchant that owns the listing.
    Owner,
    /// The owning merchant or any administrator.
    OwnerOrAdmin,
    /// Administrators only.
    Admin,
}

/// Check that `actor` may act on a listing owned by `owner_id`.
///
/// Cross-owner access is rejected regardless of the listing's status.
pub fn authorize(actor: &Actor, owner_id: DbId, authority: Authority) -> Result<(), CoreError> {
    match authority {
        Authority::Admin if actor.is_admin() => Ok(()),
        Authority::Admin => Err(CoreError::Forbidden("Admin role required".into())),
        Authority::OwnerOrAdmin if actor.is_admin() => Ok(()),
        Authority::Owner | Authority::OwnerOrAdmin => {
            if actor.user_id == owner_id {
                Ok(())
            } else {
                Err(CoreError::Forbidden(
                    "Listing belongs to another merchant".into(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_may_act_on_own_listing() {
        assert!(authorize(&Actor::merchant(7), 7, Authority::Owner).is_ok());
        assert!(authorize(&Actor::merchant(7), 7, Authority::OwnerOrAdmin).is_ok());
    }

    #[test]
    fn other_merchant_is_forbidden() {
        let err = authorize(&Actor::merchant(8), 7, Authority::Owner).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn admin_commands_require_admin_role() {
        assert!(authorize(&Actor::admin(1), 7, Authority::Admin).is_ok());
        assert!(matches!(
            authorize(&Actor::merchant(7), 7, Authority::Admin),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_may_use_owner_or_admin_commands_on_any_listing() {
        assert!(authorize(&Actor::admin(1), 7, Authority::OwnerOrAdmin).is_ok());
    }

    #[test]
    fn admin_is_not_the_owner() {
        assert!(authorize(&Actor::admin(1), 7, Authority::Owner).is_err());
    }
}
