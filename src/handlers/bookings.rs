use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::booking::BookingStatus;
use crate::error::{AppError, AppResult};
use crate::repository::booking::{Booking, BookingLedger, DbBookingStore, Passenger, PaymentRecord};
use crate::services::booking::{BookingService, CreateBookingInput, PassengerInput};
use crate::services::lifecycle::BookingLifecycle;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub tour_id: Option<i32>,
    #[serde(default)]
    pub detail: Vec<PassengerInput>,
    #[serde(default)]
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedBookingResponse {
    pub code: i64,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_bill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_bill: Option<String>,
    pub payment_expired: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub code: i64,
    pub tour_id: i32,
    pub tour_title: String,
    pub user_id: i32,
    pub user_name: String,
    pub total: f64,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
    pub passengers: Vec<Passenger>,
    pub payment: PaymentRecord,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            code: b.code,
            tour_id: b.tour.id,
            tour_title: b.tour.title,
            user_id: b.user.id,
            user_name: b.user.name,
            total: b.total,
            status: b.status,
            booked_at: b.booked_at,
            passengers: b.details,
            payment: b.payment,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

fn ensure_access(booking: &Booking, claims: &Claims) -> AppResult<()> {
    if booking.user.id != claims.sub && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "You can only view your own bookings".to_string(),
        ));
    }
    Ok(())
}

/// Book a tour and open its payment
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<CreatedBookingResponse>)> {
    let service = BookingService::new(DbBookingStore::new(state.db.clone()), state.gateway.clone());

    let booking = service
        .create(CreateBookingInput {
            tour_id: payload.tour_id,
            user_id: Some(claims.sub),
            details: payload.detail,
            payment_method: payload.payment_method,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedBookingResponse {
            code: booking.code,
            total: booking.total,
            virtual_number: booking.payment.virtual_number,
            key_bill: booking.payment.bill_key,
            code_bill: booking.payment.bill_code,
            payment_expired: booking.payment.expired_at,
        }),
    ))
}

/// List the caller's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = DbBookingStore::new(state.db.clone())
        .list_by_user(claims.sub)
        .await?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// One booking, visible to its owner and admins
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(code): Path<i64>,
) -> AppResult<Json<BookingResponse>> {
    let booking = DbBookingStore::new(state.db.clone()).find_by_code(code).await?;
    ensure_access(&booking, &claims)?;

    Ok(Json(booking.into()))
}

/// Cancel a pending booking and void its charge
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(code): Path<i64>,
) -> AppResult<Json<BookingResponse>> {
    let lifecycle = BookingLifecycle::new(DbBookingStore::new(state.db.clone()), state.gateway.clone());
    let cancelled = lifecycle.cancel(code, claims.sub, Utc::now()).await?;

    Ok(Json(cancelled.into()))
}

/// List all bookings (admin)
pub async fn list_all_bookings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = DbBookingStore::new(state.db.clone()).list_all().await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// Set a booking's status (admin)
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(code): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<BookingResponse>> {
    let lifecycle = BookingLifecycle::new(DbBookingStore::new(state.db.clone()), state.gateway.clone());
    let updated = lifecycle.set_status(code, payload.status, Utc::now()).await?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_shape() {
        let request: CreateBookingRequest = serde_json::from_str(
            r#"{
                "tour_id": 7,
                "detail": [{
                    "document_number": "3174012345",
                    "greeting": "Mr",
                    "name": "Budi Santoso",
                    "nationality": "Indonesia",
                    "dob": "1990-04-12"
                }],
                "payment_method": "bca"
            }"#,
        )
        .unwrap();

        assert_eq!(request.tour_id, Some(7));
        assert_eq!(request.detail.len(), 1);
        assert_eq!(request.detail[0].greeting.as_deref(), Some("Mr"));
        assert!(request.detail[0].dob.is_some());
    }

    #[test]
    fn test_missing_fields_reach_validation() {
        let request: CreateBookingRequest = serde_json::from_str("{}").unwrap();
        assert!(request.tour_id.is_none());
        assert!(request.detail.is_empty());
    }

    #[test]
    fn test_created_response_omits_absent_identifiers() {
        let body = serde_json::to_value(CreatedBookingResponse {
            code: 1271_700_000_000,
            total: 1_805_000.0,
            virtual_number: Some("988001234567".to_string()),
            key_bill: None,
            code_bill: None,
            payment_expired: None,
        })
        .unwrap();

        assert_eq!(body["virtual_number"], "988001234567");
        assert!(body.get("key_bill").is_none());
        assert!(body.get("payment_expired").is_some());
    }
}
