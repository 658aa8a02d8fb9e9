pub mod users;
pub mod villa;
pub mod villa_number;

use villa_core::error::CoreError;
use villa_core::types::DbId;

use crate::error::AppError;

/// Reject the reserved identity `0` before touching the store.
pub(crate) fn require_nonzero_id(id: DbId) -> Result<DbId, AppError> {
    if id == 0 {
        return Err(AppError::Core(CoreError::Validation("id must be non-zero".into())));
    }
    Ok(id)
}
