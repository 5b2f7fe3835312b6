//! Driven port for user persistence.
//!
//! Adapters translate between their storage representation and the domain
//! [`User`]. They perform each call as a single atomic operation and leave
//! isolation to the backing store.

use async_trait::async_trait;

use crate::domain::{User, UserId, UserPatch, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Storage contract for users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every stored user, ordered by id.
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier; `None` when it does not exist.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user. The store assigns and returns the identifier.
    async fn create(&self, profile: &UserProfile) -> Result<User, UserPersistenceError>;

    /// Write the fields present in `patch` and return the stored result.
    ///
    /// Only submitted columns are written, so concurrent patches touching
    /// different fields both survive. Returns `None` when no record with `id`
    /// exists.
    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Permanently remove a user. Returns `false` when nothing was removed.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Cheap round trip proving the store can serve requests.
    async fn ping(&self) -> Result<(), UserPersistenceError>;
}
