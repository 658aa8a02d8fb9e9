//! Repository for the `villas` table.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::models::villa::Villa;
use crate::repositories::Repository;
use crate::store::{EntityStore, StoreError};

/// Villa unit of work. Reads, `create` and `remove` come from [`Repository`].
pub struct VillaRepo {
    inner: Repository<Villa>,
}

impl VillaRepo {
    pub fn new(store: Arc<dyn EntityStore<Villa>>) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    /// Stamp `updated_date`, persist every field of `villa` and return the stored row.
    pub async fn update(&mut self, villa: Villa) -> Result<Villa, StoreError> {
        let id = villa.id;
        let villa = self.inner.stamp_and_update(villa).await?;
        tracing::info!(villa_id = id, "Villa updated");
        Ok(villa)
    }
}

impl Deref for VillaRepo {
    type Target = Repository<Villa>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for VillaRepo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
