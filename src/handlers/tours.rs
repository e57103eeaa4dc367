use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::{airline, facility, location, review, tour, tour_facility};
use crate::error::{AppError, AppResult};
use crate::utils::validation::{invalid, optional_text, required_id, required_text};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub airline_id: Option<i32>,
    pub location_id: Option<i32>,
    pub price: Option<f64>,
    pub admin_fee: Option<f64>,
    pub discount: Option<i32>,
    pub quota: Option<i32>,
    /// Defaults to `quota`.
    pub available: Option<i32>,
    pub start_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub facility_ids: Vec<i32>,
}

/// Absent fields keep their stored value; an explicit zero discount is a
/// real update.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTourRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub airline_id: Option<i32>,
    pub location_id: Option<i32>,
    pub price: Option<f64>,
    pub admin_fee: Option<f64>,
    pub discount: Option<i32>,
    pub quota: Option<i32>,
    pub available: Option<i32>,
    pub start_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub facility_ids: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize)]
pub struct TourQuery {
    pub location_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct TourSummary {
    pub id: i32,
    pub title: String,
    pub location: String,
    pub airline: String,
    pub price: f64,
    pub discount: i32,
    pub available: i32,
    pub start_at: DateTime<Utc>,
    pub finish_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TourDetail {
    #[serde(flatten)]
    pub tour: tour::Model,
    pub airline: Option<airline::Model>,
    pub location: Option<location::Model>,
    pub facilities: Vec<facility::Model>,
    pub rating: Option<f64>,
    pub review_count: usize,
}

/// Pricing, capacity and schedule rules every stored tour satisfies.
#[derive(Debug, Clone, Copy)]
pub struct TourTerms {
    pub price: f64,
    pub admin_fee: f64,
    pub discount: i32,
    pub quota: i32,
    pub available: i32,
    pub start_at: DateTime<Utc>,
    pub finish_at: DateTime<Utc>,
}

impl TourTerms {
    pub fn check(&self) -> AppResult<()> {
        if !(self.price >= 0.0) {
            return Err(invalid("price"));
        }
        if !(self.admin_fee >= 0.0) {
            return Err(invalid("admin fee"));
        }
        if !(0..=100).contains(&self.discount) {
            return Err(AppError::Validation(
                "discount must be between 0 and 100".to_string(),
            ));
        }
        if self.quota <= 0 {
            return Err(invalid("quota"));
        }
        if self.available < 0 || self.available > self.quota {
            return Err(AppError::Validation(
                "available seats must be between 0 and quota".to_string(),
            ));
        }
        if self.start_at >= self.finish_at {
            return Err(AppError::Validation(
                "tour must start before it finishes".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&tour::Model> for TourTerms {
    fn from(t: &tour::Model) -> Self {
        Self {
            price: t.price,
            admin_fee: t.admin_fee,
            discount: t.discount,
            quota: t.quota,
            available: t.available,
            start_at: t.start_at.with_timezone(&Utc),
            finish_at: t.finish_at.with_timezone(&Utc),
        }
    }
}

async fn ensure_references<C: ConnectionTrait>(
    conn: &C,
    airline_id: Option<i32>,
    location_id: Option<i32>,
    facility_ids: Option<&[i32]>,
) -> AppResult<()> {
    if let Some(id) = airline_id {
        airline::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid airline".to_string()))?;
    }
    if let Some(id) = location_id {
        location::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid location".to_string()))?;
    }
    if let Some(ids) = facility_ids {
        let unique: BTreeSet<i32> = ids.iter().copied().collect();
        let found = facility::Entity::find()
            .filter(facility::Column::Id.is_in(unique.iter().copied()))
            .count(conn)
            .await?;
        if found as usize != unique.len() {
            return Err(AppError::BadRequest("Invalid facility".to_string()));
        }
    }
    Ok(())
}

async fn replace_facilities<C: ConnectionTrait>(
    conn: &C,
    tour_id: i32,
    facility_ids: &[i32],
) -> AppResult<()> {
    tour_facility::Entity::delete_many()
        .filter(tour_facility::Column::TourId.eq(tour_id))
        .exec(conn)
        .await?;

    let unique: BTreeSet<i32> = facility_ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(());
    }

    tour_facility::Entity::insert_many(unique.into_iter().map(|facility_id| {
        tour_facility::ActiveModel {
            tour_id: Set(tour_id),
            facility_id: Set(facility_id),
        }
    }))
    .exec(conn)
    .await?;

    Ok(())
}

async fn load_detail(db: &DatabaseConnection, tour: tour::Model) -> AppResult<TourDetail> {
    let airline = airline::Entity::find_by_id(tour.airline_id).one(db).await?;
    let location = location::Entity::find_by_id(tour.location_id).one(db).await?;
    let facilities = tour
        .find_related(facility::Entity)
        .order_by_asc(facility::Column::Name)
        .all(db)
        .await?;
    let ratings: Vec<f64> = review::Entity::find()
        .filter(review::Column::TourId.eq(tour.id))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    let rating = (!ratings.is_empty())
        .then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

    Ok(TourDetail {
        tour,
        airline,
        location,
        facilities,
        rating,
        review_count: ratings.len(),
    })
}

/// List tours, optionally within one location
pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<TourQuery>,
) -> AppResult<Json<Vec<TourSummary>>> {
    let mut select = tour::Entity::find().order_by_asc(tour::Column::StartAt);
    if let Some(location_id) = query.location_id {
        select = select.filter(tour::Column::LocationId.eq(location_id));
    }
    let tours = select.all(&state.db).await?;

    let airlines: HashMap<i32, String> = airline::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let locations: HashMap<i32, String> = location::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|l| (l.id, l.name))
        .collect();

    let responses = tours
        .into_iter()
        .map(|t| TourSummary {
            id: t.id,
            location: locations.get(&t.location_id).cloned().unwrap_or_default(),
            airline: airlines.get(&t.airline_id).cloned().unwrap_or_default(),
            title: t.title,
            price: t.price,
            discount: t.discount,
            available: t.available,
            start_at: t.start_at.with_timezone(&Utc),
            finish_at: t.finish_at.with_timezone(&Utc),
            image_url: t.image_url,
        })
        .collect();

    Ok(Json(responses))
}

/// Tour details with airline, location, facilities and rating
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<TourDetail>> {
    let tour = tour::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    Ok(Json(load_detail(&state.db, tour).await?))
}

/// Create a tour (admin)
pub async fn create_tour(
    State(state): State<AppState>,
    Json(payload): Json<CreateTourRequest>,
) -> AppResult<(StatusCode, Json<TourDetail>)> {
    let title = required_text(payload.title, "title")?;
    let description = required_text(payload.description, "description")?;
    let airline_id = required_id(payload.airline_id, "airline id")?;
    let location_id = required_id(payload.location_id, "location id")?;
    let quota = payload.quota.ok_or_else(|| invalid("quota"))?;

    let terms = TourTerms {
        price: payload.price.ok_or_else(|| invalid("price"))?,
        admin_fee: payload.admin_fee.unwrap_or(0.0),
        discount: payload.discount.unwrap_or(0),
        quota,
        available: payload.available.unwrap_or(quota),
        start_at: payload.start_at.ok_or_else(|| invalid("start date"))?,
        finish_at: payload.finish_at.ok_or_else(|| invalid("finish date"))?,
    };
    terms.check()?;

    let txn = state.db.begin().await?;
    ensure_references(
        &txn,
        Some(airline_id),
        Some(location_id),
        Some(payload.facility_ids.as_slice()),
    )
    .await?;

    let tour = tour::ActiveModel {
        title: Set(title),
        description: Set(description),
        airline_id: Set(airline_id),
        location_id: Set(location_id),
        price: Set(terms.price),
        admin_fee: Set(terms.admin_fee),
        discount: Set(terms.discount),
        quota: Set(terms.quota),
        available: Set(terms.available),
        start_at: Set(terms.start_at.fixed_offset()),
        finish_at: Set(terms.finish_at.fixed_offset()),
        image_url: Set(payload.image_url.filter(|u| !u.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    replace_facilities(&txn, tour.id, &payload.facility_ids).await?;
    txn.commit().await?;

    tracing::info!(tour_id = tour.id, "Tour created");
    Ok((StatusCode::CREATED, Json(load_detail(&state.db, tour).await?)))
}

/// Merge a partial update into the stored tour. Only columns the request
/// touches are marked for writing, so a concurrent seat change is never
/// overwritten by an unrelated edit.
pub fn apply_update(
    current: tour::Model,
    payload: &UpdateTourRequest,
) -> AppResult<tour::ActiveModel> {
    let mut terms = TourTerms::from(&current);
    if let Some(price) = payload.price {
        terms.price = price;
    }
    if let Some(admin_fee) = payload.admin_fee {
        terms.admin_fee = admin_fee;
    }
    if let Some(discount) = payload.discount {
        terms.discount = discount;
    }
    if let Some(quota) = payload.quota {
        // Seats already sold stay sold when the quota moves
        let sold = current.quota - current.available;
        terms.quota = quota;
        terms.available = quota - sold;
    }
    if let Some(available) = payload.available {
        terms.available = available;
    }
    if let Some(start_at) = payload.start_at {
        terms.start_at = start_at;
    }
    if let Some(finish_at) = payload.finish_at {
        terms.finish_at = finish_at;
    }
    terms.check()?;

    let mut active: tour::ActiveModel = current.into();
    if let Some(title) = optional_text(payload.title.clone(), "title")? {
        active.title = Set(title);
    }
    if let Some(description) = optional_text(payload.description.clone(), "description")? {
        active.description = Set(description);
    }
    if let Some(airline_id) = payload.airline_id {
        active.airline_id = Set(airline_id);
    }
    if let Some(location_id) = payload.location_id {
        active.location_id = Set(location_id);
    }
    if let Some(image_url) = &payload.image_url {
        let image_url = image_url.trim().to_string();
        active.image_url = Set((!image_url.is_empty()).then_some(image_url));
    }
    if payload.price.is_some() {
        active.price = Set(terms.price);
    }
    if payload.admin_fee.is_some() {
        active.admin_fee = Set(terms.admin_fee);
    }
    if payload.discount.is_some() {
        active.discount = Set(terms.discount);
    }
    if payload.quota.is_some() || payload.available.is_some() {
        active.quota = Set(terms.quota);
        active.available = Set(terms.available);
    }
    if payload.start_at.is_some() {
        active.start_at = Set(terms.start_at.fixed_offset());
    }
    if payload.finish_at.is_some() {
        active.finish_at = Set(terms.finish_at.fixed_offset());
    }

    Ok(active)
}

/// Partially update a tour (admin)
pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTourRequest>,
) -> AppResult<Json<TourDetail>> {
    let txn = state.db.begin().await?;

    // Held until commit, so bookings cannot take seats between the read and
    // the write below.
    let current = tour::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    ensure_references(
        &txn,
        payload.airline_id,
        payload.location_id,
        payload.facility_ids.as_deref(),
    )
    .await?;

    let tour = apply_update(current, &payload)?.update(&txn).await?;

    if let Some(facility_ids) = &payload.facility_ids {
        replace_facilities(&txn, tour.id, facility_ids).await?;
    }
    txn.commit().await?;

    Ok(Json(load_detail(&state.db, tour).await?))
}

/// Delete a tour (admin)
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = tour::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tour not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Tour deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn terms() -> TourTerms {
        let start = Utc::now();
        TourTerms {
            price: 1_000_000.0,
            admin_fee: 5_000.0,
            discount: 0,
            quota: 20,
            available: 20,
            start_at: start,
            finish_at: start + Duration::days(3),
        }
    }

    #[test]
    fn test_valid_terms() {
        assert!(terms().check().is_ok());
    }

    #[test]
    fn test_available_cannot_exceed_quota() {
        let t = TourTerms {
            available: 21,
            ..terms()
        };
        assert!(matches!(t.check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert!(TourTerms { price: -1.0, ..terms() }.check().is_err());
        assert!(TourTerms { admin_fee: -0.5, ..terms() }.check().is_err());
        assert!(TourTerms { price: f64::NAN, ..terms() }.check().is_err());
    }

    #[test]
    fn test_discount_range() {
        assert!(TourTerms { discount: 100, ..terms() }.check().is_ok());
        assert!(TourTerms { discount: 101, ..terms() }.check().is_err());
        assert!(TourTerms { discount: -1, ..terms() }.check().is_err());
    }

    fn stored(available: i32) -> tour::Model {
        let mut t = crate::repository::booking::test_support::sample_tour();
        t.available = available;
        t
    }

    #[test]
    fn test_title_edit_leaves_seats_unwritten() {
        let update = UpdateTourRequest {
            title: Some("Bromo Midnight".to_string()),
            price: Some(1_200_000.0),
            ..Default::default()
        };

        let active = apply_update(stored(18), &update).unwrap();

        assert!(active.title.is_set());
        assert!(active.price.is_set());
        assert!(!active.available.is_set());
        assert!(!active.quota.is_set());
        assert!(!active.discount.is_set());
    }

    #[test]
    fn test_quota_change_keeps_sold_seats() {
        let update = UpdateTourRequest {
            quota: Some(30),
            ..Default::default()
        };

        let active = apply_update(stored(18), &update).unwrap();

        assert_eq!(active.quota.clone().unwrap(), 30);
        assert_eq!(active.available.clone().unwrap(), 28);
    }

    #[test]
    fn test_quota_below_sold_seats_is_rejected() {
        let update = UpdateTourRequest {
            quota: Some(1),
            ..Default::default()
        };

        assert!(matches!(
            apply_update(stored(18), &update),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_schedule_order() {
        let t = terms();
        let reversed = TourTerms {
            start_at: t.finish_at,
            finish_at: t.start_at,
            ..t
        };
        assert!(reversed.check().is_err());
    }
}
