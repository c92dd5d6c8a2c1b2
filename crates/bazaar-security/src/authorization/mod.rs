//! Resource authorization.
//!
//! Every check names an [`Actor`], an [`Action`], and an
//! [`AuthorizationTarget`]. [`PolicyAuthorizer`] routes the check to the
//! policy registered for the target's variant.

mod policies;

pub use policies::*;

use bazaar_core::{BazaarError, BazaarResult, UserId, UserRole};
use std::fmt;

/// The authenticated principal performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    /// Change another account's role or status.
    Administer,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Administer => "administer",
        })
    }
}

/// What an action is performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationTarget {
    Category,
    Question,
    /// A specific account.
    User(UserId),
}

impl AuthorizationTarget {
    /// Variant name used for dispatch and error messages.
    #[must_use]
    pub const fn tag(&self) -> TargetTag {
        match self {
            Self::Category => TargetTag::Category,
            Self::Question => TargetTag::Question,
            Self::User(_) => TargetTag::User,
        }
    }
}

/// Discriminant of [`AuthorizationTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetTag {
    Category,
    Question,
    User,
}

impl fmt::Display for TargetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Question => "question",
            Self::User => "user",
        })
    }
}

/// Decides whether an actor may perform an action on a resource of type `R`.
pub trait Authorizer<R>: Send + Sync {
    fn allows(&self, actor: &Actor, action: Action, resource: &R) -> bool;
}

/// Turns a denial into `BazaarError::Forbidden`.
pub trait AuthorizerExt: Authorizer<AuthorizationTarget> {
    fn authorize(&self, actor: &Actor, action: Action, target: &AuthorizationTarget) -> BazaarResult<()> {
        if self.allows(actor, action, target) {
            Ok(())
        } else {
            Err(BazaarError::forbidden(format!(
                "{} may not {} {}",
                actor.role,
                action,
                target.tag()
            )))
        }
    }
}

impl<T: Authorizer<AuthorizationTarget> + ?Sized> AuthorizerExt for T {}

/// Routes checks to one policy per target variant.
pub struct PolicyAuthorizer {
    category: Box<dyn Authorizer<AuthorizationTarget>>,
    question: Box<dyn Authorizer<AuthorizationTarget>>,
    user: Box<dyn Authorizer<AuthorizationTarget>>,
}

impl PolicyAuthorizer {
    /// Catalog writes for admins, account access for owners and admins.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            category: Box::new(CatalogPolicy::new(UserRole::Admin)),
            question: Box::new(CatalogPolicy::new(UserRole::Admin)),
            user: Box::new(AccountPolicy),
        }
    }

    #[must_use]
    pub fn with_policies(
        category: Box<dyn Authorizer<AuthorizationTarget>>,
        question: Box<dyn Authorizer<AuthorizationTarget>>,
        user: Box<dyn Authorizer<AuthorizationTarget>>,
    ) -> Self {
        Self {
            category,
            question,
            user,
        }
    }
}

impl Default for PolicyAuthorizer {
    fn default() -> Self {
        Self::standard()
    }
}

impl Authorizer<AuthorizationTarget> for PolicyAuthorizer {
    fn allows(&self, actor: &Actor, action: Action, target: &AuthorizationTarget) -> bool {
        let policy = match target.tag() {
            TargetTag::Category => &self.category,
            TargetTag::Question => &self.question,
            TargetTag::User => &self.user,
        };
        policy.allows(actor, action, target)
    }
}

impl fmt::Debug for PolicyAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyAuthorizer").finish_non_exhaustive()
    }
}
