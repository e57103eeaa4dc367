use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::entities::airline;
use crate::error::{AppError, AppResult};
use crate::utils::validation::{optional_text, required_text};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AirlineRequest {
    pub name: Option<String>,
}

/// List airlines
pub async fn list_airlines(State(state): State<AppState>) -> AppResult<Json<Vec<airline::Model>>> {
    let airlines = airline::Entity::find()
        .order_by_asc(airline::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(airlines))
}

/// Create an airline (admin). Names are unique.
pub async fn create_airline(
    State(state): State<AppState>,
    Json(payload): Json<AirlineRequest>,
) -> AppResult<(StatusCode, Json<airline::Model>)> {
    let name = required_text(payload.name, "airline name")?;

    let airline = airline::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(airline)))
}

/// Update an airline (admin)
pub async fn update_airline(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AirlineRequest>,
) -> AppResult<Json<airline::Model>> {
    let airline = airline::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Airline not found".to_string()))?;

    let mut active: airline::ActiveModel = airline.into();
    if let Some(name) = optional_text(payload.name, "airline name")? {
        active.name = Set(name);
    }

    Ok(Json(active.update(&state.db).await?))
}

/// Delete an airline (admin)
pub async fn delete_airline(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = airline::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Airline not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Airline deleted" })))
}
