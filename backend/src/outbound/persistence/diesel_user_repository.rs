//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Each port method is a single statement on a pooled connection, so the
//! database provides atomicity for create, update, and delete. Updates set
//! only the submitted columns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserId, UserPatch, UserProfile};

use super::models::{NewUserRow, UserChanges, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        email,
        firstname,
        lastname,
    } = row;
    User::try_from_parts(id, &email, &firstname, &lastname)
        .map_err(|err| UserPersistenceError::query(format!("stored user {id} is invalid: {err}")))
}

fn changes_for(patch: &UserPatch) -> UserChanges<'_> {
    UserChanges {
        email: patch.email.as_ref().map(AsRef::<str>::as_ref),
        firstname: patch.firstname.as_ref().map(AsRef::<str>::as_ref),
        lastname: patch.lastname.as_ref().map(AsRef::<str>::as_ref),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn create(&self, profile: &UserProfile) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            email: profile.email.as_ref(),
            firstname: profile.firstname.as_ref(),
            lastname: profile.lastname.as_ref(),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        // Diesel rejects an empty changeset.
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = changes_for(patch);
        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted_rows = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted_rows > 0)
    }

    async fn ping(&self) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Error and row mapping coverage; queries are exercised against a live
    //! database only.
    use super::*;
    use crate::domain::PersonName;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert_eq!(
            repo_err,
            UserPersistenceError::connection("connection refused")
        );
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(repo_err, UserPersistenceError::query("record not found"));
    }

    #[rstest]
    fn changes_carry_only_submitted_fields() {
        let patch = UserPatch {
            lastname: Some(PersonName::new(" Meier ").expect("valid name")),
            ..UserPatch::default()
        };

        let changes = changes_for(&patch);

        assert_eq!(changes.email, None);
        assert_eq!(changes.firstname, None);
        assert_eq!(changes.lastname, Some("Meier"));
    }

    #[rstest]
    fn valid_row_converts_to_user() {
        let user = row_to_user(UserRow {
            id: 5,
            email: "mia.muster@musterfirma.de".into(),
            firstname: "Mia".into(),
            lastname: "Muster".into(),
        })
        .expect("valid row");

        assert_eq!(user.id().get(), 5);
        assert_eq!(user.lastname().as_ref(), "Muster");
    }

    #[rstest]
    fn corrupt_row_surfaces_as_query_error() {
        let err = row_to_user(UserRow {
            id: 5,
            email: "broken".into(),
            firstname: "Mia".into(),
            lastname: "Muster".into(),
        })
        .expect_err("invalid email in storage");

        assert!(matches!(err, UserPersistenceError::Query { .. }));
        assert!(err.to_string().contains("stored user 5 is invalid"));
    }
}
