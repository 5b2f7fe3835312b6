//! Process-local user store.
//!
//! Backs the service when no database URL is configured and gives HTTP
//! tests a real repository without I/O. Identifiers start at 1 and are never
//! reused, mirroring a database sequence.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserId, UserPatch, UserProfile};

#[derive(Debug)]
struct Store {
    last_id: i64,
    users: BTreeMap<UserId, User>,
}

/// In-memory implementation of the [`UserRepository`] port.
///
/// # Examples
/// ```
/// use user_api::domain::ports::UserRepository;
/// use user_api::outbound::memory::InMemoryUserRepository;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = InMemoryUserRepository::default();
/// assert!(repo.find_all().await.unwrap().is_empty());
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryUserRepository {
    store: Mutex<Store>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            store: Mutex::new(Store {
                last_id: 0,
                users: BTreeMap::new(),
            }),
        }
    }
}

impl InMemoryUserRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Store>, UserPersistenceError> {
        self.store
            .lock()
            .map_err(|_| UserPersistenceError::query("in-memory user store is poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(&self, profile: &UserProfile) -> Result<User, UserPersistenceError> {
        let mut store = self.lock()?;
        let next = store
            .last_id
            .checked_add(1)
            .ok_or_else(|| UserPersistenceError::query("user id sequence exhausted"))?;
        let id = UserId::new(next).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        store.last_id = next;

        let user = User::new(id, profile.clone());
        store.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut store = self.lock()?;
        let Some(slot) = store.users.get_mut(&id) else {
            return Ok(None);
        };
        // Merge under the lock so concurrent patches see each other's writes.
        *slot = slot.clone().apply(patch.clone());
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock()?.users.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), UserPersistenceError> {
        self.lock().map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailAddress, PersonName};
    use rstest::{fixture, rstest};

    #[fixture]
    fn profile() -> UserProfile {
        UserProfile {
            email: EmailAddress::new("mia.muster@musterfirma.de").expect("valid email"),
            firstname: PersonName::new("Mia").expect("valid name"),
            lastname: PersonName::new("Muster").expect("valid name"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_increasing_ids(profile: UserProfile) {
        let repo = InMemoryUserRepository::default();

        let first = repo.create(&profile).await.expect("create");
        let second = repo.create(&profile).await.expect("create");

        assert_eq!(first.id().get(), 1);
        assert_eq!(second.id().get(), 2);
        assert_eq!(repo.find_all().await.expect("list").len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_not_reused_after_delete(profile: UserProfile) {
        let repo = InMemoryUserRepository::default();
        let first = repo.create(&profile).await.expect("create");

        assert!(repo.delete(first.id()).await.expect("delete"));
        let second = repo.create(&profile).await.expect("create");

        assert_eq!(second.id().get(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn update_writes_only_submitted_fields(profile: UserProfile) {
        let repo = InMemoryUserRepository::default();
        let created = repo.create(&profile).await.expect("create");
        let patch = UserPatch {
            lastname: Some(PersonName::new("Meier").expect("valid name")),
            ..UserPatch::default()
        };

        let updated = repo
            .update(created.id(), &patch)
            .await
            .expect("update")
            .expect("user exists");

        assert_eq!(updated.lastname().as_ref(), "Meier");
        assert_eq!(updated.firstname().as_ref(), "Mia");
        assert_eq!(
            repo.find_by_id(created.id()).await.expect("fetch"),
            Some(updated)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_id_reports_absence() {
        let repo = InMemoryUserRepository::default();
        let ghost = UserId::new(99).expect("valid id");

        let outcome = repo.update(ghost, &UserPatch::default()).await.expect("update");

        assert!(outcome.is_none());
        assert!(repo.find_by_id(ghost).await.expect("fetch").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_twice_reports_absence(profile: UserProfile) {
        let repo = InMemoryUserRepository::default();
        let created = repo.create(&profile).await.expect("create");

        assert!(repo.delete(created.id()).await.expect("delete"));
        assert!(!repo.delete(created.id()).await.expect("delete"));
    }

    #[rstest]
    #[tokio::test]
    async fn ping_succeeds_on_healthy_store() {
        assert!(InMemoryUserRepository::default().ping().await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn list_is_ordered_by_id(profile: UserProfile) {
        let repo = InMemoryUserRepository::default();
        for _ in 0..3 {
            repo.create(&profile).await.expect("create");
        }

        let ids: Vec<i64> = repo
            .find_all()
            .await
            .expect("list")
            .iter()
            .map(|user| user.id().get())
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }
}
