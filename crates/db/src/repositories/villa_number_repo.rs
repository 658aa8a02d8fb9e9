//! Repository for the `villa_numbers` table.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::models::villa_number::VillaNumber;
use crate::repositories::Repository;
use crate::store::{EntityStore, StoreError};

/// Villa number unit of work.
///
/// Callers must confirm the parent villa exists before `create` or `update`;
/// the store does not check the reference.
pub struct VillaNumberRepo {
    inner: Repository<VillaNumber>,
}

impl VillaNumberRepo {
    pub fn new(store: Arc<dyn EntityStore<VillaNumber>>) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    pub async fn update(&mut self, villa_number: VillaNumber) -> Result<VillaNumber, StoreError> {
        let villa_no = villa_number.villa_no;
        let villa_number = self.inner.stamp_and_update(villa_number).await?;
        tracing::info!(villa_no, "Villa number updated");
        Ok(villa_number)
    }
}

impl Deref for VillaNumberRepo {
    type Target = Repository<VillaNumber>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for VillaNumberRepo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
