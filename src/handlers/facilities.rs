use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::entities::facility;
use crate::error::{AppError, AppResult};
use crate::utils::validation::{optional_text, required_text};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FacilityRequest {
    pub name: Option<String>,
}

pub async fn list_facilities(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<facility::Model>>> {
    let facilities = facility::Entity::find()
        .order_by_asc(facility::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(facilities))
}

pub async fn create_facility(
    State(state): State<AppState>,
    Json(payload): Json<FacilityRequest>,
) -> AppResult<(StatusCode, Json<facility::Model>)> {
    let name = required_text(payload.name, "facility name")?;

    let facility = facility::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(facility)))
}

pub async fn update_facility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FacilityRequest>,
) -> AppResult<Json<facility::Model>> {
    let facility = facility::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Facility not found".to_string()))?;

    let mut active: facility::ActiveModel = facility.into();
    if let Some(name) = optional_text(payload.name, "facility name")? {
        active.name = Set(name);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_facility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = facility::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Facility not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Facility deleted" })))
}
