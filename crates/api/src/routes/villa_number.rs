//! Route definitions for the `/villa-numbers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::villa_number;
use crate::state::AppState;

/// Routes mounted at `/villa-numbers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(villa_number::list).post(villa_number::create))
        .route(
            "/{villa_no}",
            get(villa_number::get_by_id)
                .put(villa_number::replace)
                .patch(villa_number::patch)
                .delete(villa_number::delete),
        )
}
