//! Handlers for the `/villas` resource.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::Json;
use villa_core::error::CoreError;
use villa_core::types::DbId;
use villa_db::models::villa::{CreateVilla, ReplaceVilla, UpdateVilla, Villa};
use villa_db::store::{Entity, Filter};

use super::require_nonzero_id;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: Villa::NAME,
        id,
    })
}

/// GET /api/v1/villas
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Villa>>>> {
    let villas = state.villa_repo().get_all(None).await?;
    Ok(Json(DataResponse { data: villas }))
}

/// GET /api/v1/villas/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Villa>>> {
    let id = require_nonzero_id(id)?;
    let villa = state
        .villa_repo()
        .get(&Filter::id(id), false)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: villa }))
}

/// POST /api/v1/villas
///
/// Names are unique case-insensitively; a duplicate is a 409.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateVilla>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<DataResponse<Villa>>)> {
    let mut repo = state.villa_repo();

    let same_name: Filter<Villa> = Filter::eq_ignore_case("name", input.name.as_str());
    if repo.get(&same_name, false).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Villa '{}' already exists",
            input.name
        ))));
    }

    repo.create(Villa::new(input));
    let villa = repo
        .commit()
        .await?
        .inserted
        .pop()
        .ok_or_else(|| AppError::Core(CoreError::Internal("Insert returned no row".into())))?;

    tracing::info!(villa_id = villa.id, name = %villa.name, "Villa created");
    let location = format!("/api/v1/villas/{}", villa.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(DataResponse { data: villa }),
    ))
}

/// PUT /api/v1/villas/{id}
///
/// Replaces every editable field. The body's `id` must match the path.
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReplaceVilla>,
) -> AppResult<StatusCode> {
    let id = require_nonzero_id(id)?;
    if input.id != id {
        return Err(AppError::BadRequest(format!(
            "Body id {} does not match path id {id}",
            input.id
        )));
    }

    let mut repo = state.villa_repo();
    let mut villa = repo
        .get(&Filter::id(id), false)
        .await?
        .ok_or_else(|| not_found(id))?;
    villa.replace(input);
    repo.update(villa).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/villas/{id}
///
/// Only the supplied fields change.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVilla>,
) -> AppResult<Json<DataResponse<Villa>>> {
    let id = require_nonzero_id(id)?;
    let mut repo = state.villa_repo();
    let mut villa = repo
        .get(&Filter::id(id), false)
        .await?
        .ok_or_else(|| not_found(id))?;
    villa.apply(input);
    let villa = repo.update(villa).await?;
    Ok(Json(DataResponse { data: villa }))
}

/// DELETE /api/v1/villas/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let id = require_nonzero_id(id)?;
    let mut repo = state.villa_repo();
    let villa = repo
        .get(&Filter::id(id), true)
        .await?
        .ok_or_else(|| not_found(id))?;
    repo.remove(villa);
    repo.commit().await?;

    tracing::info!(villa_id = id, user_id = admin.user_id, "Villa deleted");
    Ok(StatusCode::NO_CONTENT)
}
