use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppResult;
use crate::repository::booking::DbBookingStore;
use crate::services::lifecycle::BookingLifecycle;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub transaction_status: String,
}

/// Gateway notification: moves the booking and its payment to the
/// status the gateway reports. Signatures are not verified.
pub async fn payment_notification(
    State(state): State<AppState>,
    Json(payload): Json<PaymentNotification>,
) -> AppResult<Json<serde_json::Value>> {
    let lifecycle = BookingLifecycle::new(DbBookingStore::new(state.db.clone()), state.gateway.clone());

    let applied = lifecycle
        .apply_notification(&payload.order_id, &payload.transaction_status, Utc::now())
        .await?;

    let message = match applied {
        Some(_) => "Notification processed",
        None => "Notification ignored",
    };
    Ok(Json(serde_json::json!({ "message": message })))
}
