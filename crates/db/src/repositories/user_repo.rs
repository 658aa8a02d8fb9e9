//! Credential store view over the `local_users` table.

use std::sync::Arc;

use crate::models::user::LocalUser;
use crate::repositories::Repository;
use crate::store::{Entity, EntityStore, Filter, StoreError};

/// Account lookups and provisioning used by login and registration.
///
/// Accounts are never updated or deleted through this view.
pub struct UserRepo {
    inner: Repository<LocalUser>,
}

impl UserRepo {
    pub fn new(store: Arc<dyn EntityStore<LocalUser>>) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    /// `true` when no account uses exactly `username` (case-sensitive).
    pub async fn is_unique(&self, username: &str) -> Result<bool, StoreError> {
        let filter: Filter<LocalUser> = Filter::eq("username", username);
        Ok(self.inner.get_all(Some(&filter)).await?.is_empty())
    }

    /// Case-insensitive username AND exact credential, in a single query.
    pub async fn find_by_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Option<LocalUser>, StoreError> {
        let filter: Filter<LocalUser> =
            Filter::eq_ignore_case("username", username).and(Filter::eq("password", password));
        self.inner.get(&filter, false).await
    }

    /// Every account whose username matches case-insensitively.
    ///
    /// Usernames are unique only case-sensitively, so `"alice"` and `"Alice"`
    /// may both come back.
    pub async fn find_by_username(&self, username: &str) -> Result<Vec<LocalUser>, StoreError> {
        let filter: Filter<LocalUser> = Filter::eq_ignore_case("username", username);
        self.inner.get_all(Some(&filter)).await
    }

    /// Insert a new account and return the stored row (credential included).
    pub async fn create(&mut self, user: LocalUser) -> Result<LocalUser, StoreError> {
        self.inner.create(user);
        let committed = self.inner.commit().await?;
        committed
            .inserted
            .into_iter()
            .next()
            .ok_or(StoreError::RowNotFound {
                entity: LocalUser::NAME,
                id: 0,
            })
    }
}
