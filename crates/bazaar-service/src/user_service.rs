//! User service trait definition.

use crate::dto::{ChangeRoleRequest, ChangeStatusRequest, UpdateProfileRequest, UserResponse};
use async_trait::async_trait;
use bazaar_core::{BazaarResult, Interface, UserId};

/// Account management.
///
/// Every successful write notifies the registered
/// [`UserObserver`](crate::UserObserver)s.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> BazaarResult<UserResponse>;

    /// Updates display name and/or email.
    async fn update_profile(&self, id: UserId, request: UpdateProfileRequest) -> BazaarResult<UserResponse>;

    async fn change_role(&self, id: UserId, request: ChangeRoleRequest) -> BazaarResult<UserResponse>;

    async fn change_status(&self, id: UserId, request: ChangeStatusRequest) -> BazaarResult<UserResponse>;

    /// Deletes a user together with their token records.
    async fn delete_user(&self, id: UserId) -> BazaarResult<()>;
}
