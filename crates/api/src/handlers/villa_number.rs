//! Handlers for the `/villa-numbers` resource.
//!
//! Unit numbers are caller-chosen. Every write that names a parent villa
//! checks that the villa exists first.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::Json;
use villa_core::error::CoreError;
use villa_core::types::DbId;
use villa_db::models::villa::Villa;
use villa_db::models::villa_number::{
    CreateVillaNumber, ReplaceVillaNumber, UpdateVillaNumber, VillaNumber,
};
use villa_db::store::{Entity, Filter};

use super::require_nonzero_id;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(villa_no: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: VillaNumber::NAME,
        id: villa_no,
    })
}

async fn ensure_villa_exists(state: &AppState, villa_id: DbId) -> AppResult<()> {
    let found = state.villa_repo().get(&Filter::id(villa_id), false).await?;
    if found.is_none() {
        return Err(AppError::Core(CoreError::InvalidReference {
            entity: Villa::NAME,
            id: villa_id,
        }));
    }
    Ok(())
}

/// GET /api/v1/villa-numbers
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<VillaNumber>>>> {
    let numbers = state.villa_number_repo().get_all(None).await?;
    Ok(Json(DataResponse { data: numbers }))
}

/// GET /api/v1/villa-numbers/{villa_no}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(villa_no): Path<DbId>,
) -> AppResult<Json<DataResponse<VillaNumber>>> {
    let villa_no = require_nonzero_id(villa_no)?;
    let number = state
        .villa_number_repo()
        .get(&Filter::id(villa_no), false)
        .await?
        .ok_or_else(|| not_found(villa_no))?;
    Ok(Json(DataResponse { data: number }))
}

/// POST /api/v1/villa-numbers
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateVillaNumber>,
) -> AppResult<(
    StatusCode,
    [(header::HeaderName, String); 1],
    Json<DataResponse<VillaNumber>>,
)> {
    let villa_no = require_nonzero_id(input.villa_no)?;
    let mut repo = state.villa_number_repo();

    if repo.get(&Filter::id(villa_no), false).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Villa number {villa_no} already exists"
        ))));
    }
    ensure_villa_exists(&state, input.villa_id).await?;

    repo.create(VillaNumber::new(input));
    let number = repo
        .commit()
        .await?
        .inserted
        .pop()
        .ok_or_else(|| AppError::Core(CoreError::Internal("Insert returned no row".into())))?;

    tracing::info!(villa_no = number.villa_no, villa_id = number.villa_id, "Villa number created");
    let location = format!("/api/v1/villa-numbers/{}", number.villa_no);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(DataResponse { data: number }),
    ))
}

/// PUT /api/v1/villa-numbers/{villa_no}
pub async fn replace(
    State(state): State<AppState>,
    Path(villa_no): Path<DbId>,
    Json(input): Json<ReplaceVillaNumber>,
) -> AppResult<StatusCode> {
    let villa_no = require_nonzero_id(villa_no)?;
    if input.villa_no != villa_no {
        return Err(AppError::BadRequest(format!(
            "Body villa_no {} does not match path villa_no {villa_no}",
            input.villa_no
        )));
    }
    ensure_villa_exists(&state, input.villa_id).await?;

    let mut repo = state.villa_number_repo();
    let mut number = repo
        .get(&Filter::id(villa_no), false)
        .await?
        .ok_or_else(|| not_found(villa_no))?;
    number.replace(input);
    repo.update(number).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/villa-numbers/{villa_no}
pub async fn patch(
    State(state): State<AppState>,
    Path(villa_no): Path<DbId>,
    Json(input): Json<UpdateVillaNumber>,
) -> AppResult<Json<DataResponse<VillaNumber>>> {
    let villa_no = require_nonzero_id(villa_no)?;
    if let Some(villa_id) = input.villa_id {
        ensure_villa_exists(&state, villa_id).await?;
    }

    let mut repo = state.villa_number_repo();
    let mut number = repo
        .get(&Filter::id(villa_no), false)
        .await?
        .ok_or_else(|| not_found(villa_no))?;
    number.apply(input);
    let number = repo.update(number).await?;
    Ok(Json(DataResponse { data: number }))
}

/// DELETE /api/v1/villa-numbers/{villa_no}
pub async fn delete(
    State(state): State<AppState>,
    Path(villa_no): Path<DbId>,
) -> AppResult<StatusCode> {
    let villa_no = require_nonzero_id(villa_no)?;
    let mut repo = state.villa_number_repo();
    let number = repo
        .get(&Filter::id(villa_no), true)
        .await?
        .ok_or_else(|| not_found(villa_no))?;
    repo.remove(number);
    repo.commit().await?;

    tracing::info!(villa_no, "Villa number deleted");
    Ok(StatusCode::NO_CONTENT)
}
