//! User use-case service.
//!
//! Implements the [`UsersQuery`] and [`UsersCommand`] driving ports on top of
//! an injected [`UserRepository`], translating absent records into
//! `NotFound`, validation failures into `InvalidRequest`, and persistence
//! failures into `ServiceUnavailable` or `InternalError`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{UserPersistenceError, UserRepository, UsersCommand, UsersQuery};
use crate::domain::{
    Error, User, UserDraft, UserId, UserPatchDraft, ValidationErrors, validate_new_user,
    validate_user_patch,
};

/// Repository-backed implementation of the user driving ports.
#[derive(Clone)]
pub struct UsersService<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> UsersService<R> {
    /// Create a service over the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Render field failures as an `InvalidRequest` error whose `details.errors`
/// array lists `{field, code, message}` objects in field order.
fn validation_error(errors: ValidationErrors) -> Error {
    Error::invalid_request("validation failed").with_details(json!({
        "errors": errors.into_inner(),
    }))
}

impl<R> UsersService<R>
where
    R: UserRepository + ?Sized,
{
    async fn require_user(&self, id: UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<R> UsersQuery for UsersService<R>
where
    R: UserRepository + ?Sized,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repository
            .find_all()
            .await
            .map_err(map_persistence_error)
    }

    async fn fetch_user(&self, id: UserId) -> Result<User, Error> {
        self.require_user(id).await
    }
}

#[async_trait]
impl<R> UsersCommand for UsersService<R>
where
    R: UserRepository + ?Sized,
{
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error> {
        let profile = validate_new_user(&draft).map_err(validation_error)?;
        let user = self
            .repository
            .create(&profile)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    async fn update_user(&self, id: UserId, draft: UserPatchDraft) -> Result<User, Error> {
        self.require_user(id).await?;
        let patch = validate_user_patch(&draft).map_err(validation_error)?;

        let updated = self
            .repository
            .update(id, &patch)
            .await
            .map_err(map_persistence_error)?
            // Removed between the lookup and the write.
            .ok_or_else(|| user_not_found(id))?;
        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(map_persistence_error)?;
        if !removed {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
