pub mod health;
pub mod users;
pub mod villa;
pub mod villa_number;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /villas                       list (auth), create
/// /villas/{id}                  get (admin), replace, patch, delete (admin)
///
/// /villa-numbers                list, create
/// /villa-numbers/{villa_no}     get, replace, patch, delete
///
/// /users/login                  login (public)
/// /users/register               register (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/villas", villa::router())
        .nest("/villa-numbers", villa_number::router())
        .nest("/users", users::router())
}
