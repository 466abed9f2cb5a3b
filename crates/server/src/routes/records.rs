use axum::{body::Bytes, extract::{Path, State}, http::StatusCode, Json};
use service::records::{identity::record_from_body, Record};

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// List every record in stored order.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, JsonApiError> {
    let records = state.store.list().await?;
    Ok(Json(records))
}

/// Create a record from the request body; a body that is not a JSON object counts as `{}`.
pub async fn create_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>), JsonApiError> {
    let created = state.store.create(record_from_body(&body)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace the record with backend id `id`.
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Record>, JsonApiError> {
    let updated = state.store.update(&id, record_from_body(&body)).await?;
    Ok(Json(updated))
}

/// Delete the record with backend id `id`.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
