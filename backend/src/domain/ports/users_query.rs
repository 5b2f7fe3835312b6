//! Driving port for reading users.
//!
//! HTTP handlers depend on this trait rather than on a repository so that
//! persistence failures arrive already mapped to domain errors.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Read-side user use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// All users, ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// One user, or an [`crate::domain::ErrorCode::NotFound`] error.
    async fn fetch_user(&self, id: UserId) -> Result<User, Error>;
}
