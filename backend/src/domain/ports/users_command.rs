//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, User, UserDraft, UserId, UserPatchDraft};

/// Write-side user use-cases.
///
/// Commands take unvalidated drafts; implementations run the domain
/// validation and report failures as
/// [`crate::domain::ErrorCode::InvalidRequest`] with the field list in the
/// error details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and store a new user.
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error>;

    /// Merge a partial update into an existing user.
    ///
    /// The user is looked up before the draft is validated, so an unknown
    /// id yields `NotFound` even for an invalid body.
    async fn update_user(&self, id: UserId, draft: UserPatchDraft) -> Result<User, Error>;

    /// Permanently remove a user.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
