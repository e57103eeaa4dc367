use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{hash_password, validate_email, validate_password};
use crate::utils::jwt::Claims;
use crate::utils::validation::optional_text;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            role: u.role,
            created_at: u.created_at.with_timezone(&Utc),
        }
    }
}

/// Only fields that are present are written.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

async fn find_user(state: &AppState, id: i32) -> AppResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(find_user(&state, claims.sub).await?.into()))
}

/// Partially update the current user's profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let current = find_user(&state, claims.sub).await?;
    let mut active: user::ActiveModel = current.clone().into();

    if let Some(name) = optional_text(payload.name, "name")? {
        active.name = Set(name);
    }

    if payload.email.is_some() {
        let email = validate_email(payload.email)?;
        if email != current.email {
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(&email))
                .one(&state.db)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
        active.email = Set(email);
    }

    if let Some(phone) = optional_text(payload.phone, "phone")? {
        active.phone = Set(phone);
    }

    if payload.password.is_some() {
        let password = validate_password(payload.password)?;
        active.password_hash = Set(hash_password(&password)?);
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

/// Delete the current user's account
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<serde_json::Value>> {
    let result = user::Entity::delete_by_id(claims.sub).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Account deleted" })))
}

/// List all users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Delete any user account (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    if id == claims.sub {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account here".to_string(),
        ));
    }

    let result = user::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
