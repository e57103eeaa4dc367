use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::entities::location;
use crate::error::{AppError, AppResult};
use crate::utils::validation::{optional_text, required_text};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_locations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<location::Model>>> {
    let locations = location::Entity::find()
        .order_by_asc(location::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(locations))
}

pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<LocationRequest>,
) -> AppResult<(StatusCode, Json<location::Model>)> {
    let name = required_text(payload.name, "location name")?;

    let location = location::ActiveModel {
        name: Set(name),
        description: Set(payload.description.filter(|d| !d.trim().is_empty())),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<LocationRequest>,
) -> AppResult<Json<location::Model>> {
    let location = location::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

    let mut active: location::ActiveModel = location.into();
    if let Some(name) = optional_text(payload.name, "location name")? {
        active.name = Set(name);
    }
    // An empty description clears it
    if let Some(description) = payload.description {
        let description = description.trim().to_string();
        active.description = Set((!description.is_empty()).then_some(description));
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = location::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Location not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Location deleted" })))
}
