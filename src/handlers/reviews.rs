use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entities::{review, tour, user};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::utils::validation::{optional_text, required_id, required_text};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub tour_id: Option<i32>,
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub tour_id: i32,
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Ratings lie in (0, 5].
pub fn check_rating(rating: f64) -> AppResult<f64> {
    if rating > 0.0 && rating <= 5.0 {
        Ok(rating)
    } else {
        Err(AppError::Validation(
            "rating must be greater than 0 and at most 5".to_string(),
        ))
    }
}

fn to_response(r: review::Model, user_name: String) -> ReviewResponse {
    ReviewResponse {
        id: r.id,
        tour_id: r.tour_id,
        user_name,
        rating: r.rating,
        comment: r.comment,
        created_at: r.created_at.with_timezone(&Utc),
    }
}

async fn find_own_review(state: &AppState, id: i32, claims: &Claims) -> AppResult<review::Model> {
    let review = review::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    if review.user_id != claims.sub && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "You can only change your own reviews".to_string(),
        ));
    }

    Ok(review)
}

/// Reviews for a tour, newest first
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(tour_id): Path<i32>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let reviews = review::Entity::find()
        .filter(review::Column::TourId.eq(tour_id))
        .order_by_desc(review::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let responses = reviews
        .into_iter()
        .map(|(r, u)| to_response(r, u.map(|u| u.name).unwrap_or_default()))
        .collect();

    Ok(Json(responses))
}

/// Review a tour
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let tour_id = required_id(payload.tour_id, "tour id")?;
    let rating = check_rating(payload.rating.unwrap_or(0.0))?;
    let comment = required_text(payload.comment, "comment")?;

    tour::Entity::find_by_id(tour_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    let author = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let review = review::ActiveModel {
        tour_id: Set(tour_id),
        user_id: Set(claims.sub),
        rating: Set(rating),
        comment: Set(comment),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(review, author.name))))
}

/// Partially update one's own review
pub async fn update_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = find_own_review(&state, id, &claims).await?;

    let mut active: review::ActiveModel = review.into();
    if let Some(rating) = payload.rating {
        active.rating = Set(check_rating(rating)?);
    }
    if let Some(comment) = optional_text(payload.comment, "comment")? {
        active.comment = Set(comment);
    }
    let updated = active.update(&state.db).await?;

    let author = user::Entity::find_by_id(updated.user_id).one(&state.db).await?;
    Ok(Json(to_response(
        updated,
        author.map(|u| u.name).unwrap_or_default(),
    )))
}

/// Delete one's own review
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let review = find_own_review(&state, id, &claims).await?;
    review::Entity::delete_by_id(review.id).exec(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Review deleted" })))
}
