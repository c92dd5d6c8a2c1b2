//! Built-in authorization policies.

use super::{Action, Actor, AuthorizationTarget, Authorizer};
use bazaar_core::UserRole;

/// Anyone authenticated may view; writes need `min_write_role`.
#[derive(Debug, Clone, Copy)]
pub struct CatalogPolicy {
    min_write_role: UserRole,
}

impl CatalogPolicy {
    #[must_use]
    pub const fn new(min_write_role: UserRole) -> Self {
        Self { min_write_role }
    }
}

impl Authorizer<AuthorizationTarget> for CatalogPolicy {
    fn allows(&self, actor: &Actor, action: Action, _target: &AuthorizationTarget) -> bool {
        match action {
            Action::View => true,
            Action::Create | Action::Update | Action::Delete | Action::Administer => {
                actor.role.has_permission(self.min_write_role)
            }
        }
    }
}

/// Owners manage their own account; admins manage every account.
/// Changing role or status is admin-only, including on oneself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountPolicy;

impl Authorizer<AuthorizationTarget> for AccountPolicy {
    fn allows(&self, actor: &Actor, action: Action, target: &AuthorizationTarget) -> bool {
        let is_admin = actor.role.has_permission(UserRole::Admin);
        let AuthorizationTarget::User(owner) = target else {
            return false;
        };
        match action {
            Action::View | Action::Update | Action::Delete => is_admin || *owner == actor.user_id,
            Action::Create => true,
            Action::Administer => is_admin,
        }
    }
}
