//! User service implementation.

use crate::dto::{ChangeRoleRequest, ChangeStatusRequest, UpdateProfileRequest, UserResponse};
use crate::observer::UserObserver;
use crate::user_service::UserService;
use async_trait::async_trait;
use bazaar_core::{BazaarError, BazaarResult, Email, User, UserId, ValidateExt};
use bazaar_repository::UserRepository;
use std::sync::Arc;
use tracing::{debug, info};

/// User service backed by a [`UserRepository`].
pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    observers: Vec<Arc<dyn UserObserver>>,
}

impl UserServiceImpl {
    /// Creates a new user service with no observers.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self {
            user_repository,
            observers: Vec::new(),
        }
    }

    /// Registers an observer for user writes.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn UserObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    async fn load(&self, id: UserId) -> BazaarResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| BazaarError::not_found("User", id))
    }

    async fn store(&self, user: &User) -> BazaarResult<User> {
        let updated = self.user_repository.update(user).await?;
        for observer in &self.observers {
            observer.user_updated(&updated).await;
        }
        Ok(updated)
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(&self, id: UserId) -> BazaarResult<UserResponse> {
        debug!("Getting user: {}", id);
        Ok(UserResponse::from(self.load(id).await?))
    }

    async fn update_profile(&self, id: UserId, request: UpdateProfileRequest) -> BazaarResult<UserResponse> {
        debug!("Updating profile: {}", id);

        request.validate_request()?;

        let mut user = self.load(id).await?;

        let email = match request.email {
            Some(email) if !email.eq_ignore_ascii_case(user.email.as_str()) => {
                if self.user_repository.exists_by_email(&email).await? {
                    return Err(BazaarError::Conflict(format!("Email '{email}' already exists")));
                }
                Some(Email::new(email).map_err(|e| BazaarError::Validation(e.to_string()))?)
            }
            _ => None,
        };

        user.update_profile(request.display_name, email);
        let updated = self.store(&user).await?;

        info!("User profile updated: {}", id);
        Ok(UserResponse::from(updated))
    }

    async fn change_role(&self, id: UserId, request: ChangeRoleRequest) -> BazaarResult<UserResponse> {
        debug!("Changing user role: {} -> {}", id, request.role);

        let mut user = self.load(id).await?;
        user.change_role(request.role);
        let updated = self.store(&user).await?;

        info!("User role changed: {} -> {}", id, request.role);
        Ok(UserResponse::from(updated))
    }

    async fn change_status(&self, id: UserId, request: ChangeStatusRequest) -> BazaarResult<UserResponse> {
        debug!("Changing user status: {} -> {:?}", id, request.status);

        request.validate_request()?;

        let mut user = self.load(id).await?;
        user.change_status(request.status);
        let updated = self.store(&user).await?;

        info!(reason = ?request.reason, "User status changed: {} -> {:?}", id, request.status);
        Ok(UserResponse::from(updated))
    }

    async fn delete_user(&self, id: UserId) -> BazaarResult<()> {
        debug!("Deleting user: {}", id);

        if !self.user_repository.delete(id).await? {
            return Err(BazaarError::not_found("User", id));
        }

        for observer in &self.observers {
            observer.user_deleted(id).await;
        }

        info!("User deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
