use chrono::{DateTime, Utc};

use crate::entities::booking::BookingStatus;
use crate::error::{AppError, AppResult};
use crate::payment::PaymentGateway;
use crate::repository::booking::{Booking, BookingLedger};

/// Status changes after creation: customer cancellation, gateway
/// notifications and admin overrides.
pub struct BookingLifecycle<L, G> {
    ledger: L,
    gateway: G,
}

impl<L: BookingLedger, G: PaymentGateway> BookingLifecycle<L, G> {
    pub fn new(ledger: L, gateway: G) -> Self {
        Self { ledger, gateway }
    }

    /// Cancel a pending booking owned by `user_id`. The gateway charge is
    /// voided first; a refusal leaves the booking untouched.
    pub async fn cancel(&self, code: i64, user_id: i32, now: DateTime<Utc>) -> AppResult<Booking> {
        let booking = self.ledger.find_by_code(code).await?;

        if booking.user.id != user_id {
            return Err(AppError::Forbidden(
                "You can only cancel your own bookings".to_string(),
            ));
        }

        if booking.status != BookingStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending bookings can be cancelled".to_string(),
            ));
        }

        self.gateway.cancel_transaction(&code.to_string()).await?;

        let cancelled = self
            .ledger
            .update_status(code, BookingStatus::Cancel, Some("cancel".to_string()), now)
            .await?;
        tracing::info!(code, "Booking cancelled by customer");

        Ok(cancelled)
    }

    /// Apply a gateway notification. Statuses that do not move a booking
    /// return `None`.
    pub async fn apply_notification(
        &self,
        order_id: &str,
        transaction_status: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        let code: i64 = order_id
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid order id".to_string()))?;

        let Some(status) = BookingStatus::from_transaction_status(transaction_status) else {
            tracing::debug!(code, transaction_status, "Ignoring payment notification");
            return Ok(None);
        };

        let booking = self
            .ledger
            .update_status(code, status, Some(transaction_status.to_string()), now)
            .await?;
        tracing::info!(code, transaction_status, status = ?status, "Payment notification applied");

        Ok(Some(booking))
    }

    pub async fn set_status(
        &self,
        code: i64,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let booking = self.ledger.update_status(code, status, None, now).await?;
        tracing::info!(code, status = ?status, "Booking status set by admin");
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::booking::fakes::{stored_booking, FakeGateway, FakeLedger};

    const CODE: i64 = 1271_700_000_000;

    fn lifecycle(status: BookingStatus, gateway: FakeGateway) -> BookingLifecycle<FakeLedger, FakeGateway> {
        BookingLifecycle::new(
            FakeLedger::with(vec![stored_booking(CODE, status)], 18, 20),
            gateway,
        )
    }

    #[tokio::test]
    async fn test_owner_cancels_pending_booking() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());

        let booking = lc.cancel(CODE, 12, Utc::now()).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Cancel);
        assert_eq!(booking.payment.status, "cancel");
        assert_eq!(*lc.gateway.cancelled.lock().unwrap(), vec![CODE.to_string()]);
        assert_eq!(lc.ledger.available(), 20);
    }

    #[tokio::test]
    async fn test_other_user_cannot_cancel() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());

        let err = lc.cancel(CODE, 99, Utc::now()).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(lc.gateway.cancelled.lock().unwrap().is_empty());
        assert_eq!(lc.ledger.status_of(CODE), BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_only_pending_bookings_cancel() {
        let lc = lifecycle(BookingStatus::Approved, FakeGateway::default());

        let err = lc.cancel(CODE, 12, Utc::now()).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(lc.gateway.cancelled.lock().unwrap().is_empty());
        assert_eq!(lc.ledger.available(), 18);
    }

    #[tokio::test]
    async fn test_gateway_refusal_keeps_booking_pending() {
        let gateway = FakeGateway {
            refuse_cancel: Some("Transaction status cannot be updated".to_string()),
            ..Default::default()
        };
        let lc = lifecycle(BookingStatus::Pending, gateway);

        let err = lc.cancel(CODE, 12, Utc::now()).await.unwrap_err();

        assert!(matches!(err, AppError::PaymentGateway(_)));
        assert_eq!(lc.ledger.status_of(CODE), BookingStatus::Pending);
        assert_eq!(lc.ledger.available(), 18);
    }

    #[tokio::test]
    async fn test_settlement_approves_and_stamps_payment() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());

        let booking = lc
            .apply_notification(&CODE.to_string(), "settlement", Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Approved);
        assert_eq!(booking.payment.status, "settlement");
        assert!(booking.payment.paid_at.is_some());
        assert_eq!(lc.ledger.available(), 18);
    }

    #[tokio::test]
    async fn test_late_settlement_after_expiry_takes_seats_back() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());
        let order = CODE.to_string();

        lc.apply_notification(&order, "expire", Utc::now()).await.unwrap();
        assert_eq!(lc.ledger.available(), 20);

        lc.apply_notification(&order, "settlement", Utc::now()).await.unwrap();
        assert_eq!(lc.ledger.available(), 18);

        lc.set_status(CODE, BookingStatus::Cancel, Utc::now()).await.unwrap();
        assert_eq!(lc.ledger.available(), 20);
    }

    #[tokio::test]
    async fn test_seats_released_once_across_closing_statuses() {
        let lc = lifecycle(BookingStatus::Approved, FakeGateway::default());

        lc.set_status(CODE, BookingStatus::Cancel, Utc::now()).await.unwrap();
        lc.set_status(CODE, BookingStatus::Refunded, Utc::now()).await.unwrap();
        lc.set_status(CODE, BookingStatus::Cancel, Utc::now()).await.unwrap();

        assert_eq!(lc.ledger.available(), 20);
    }

    #[tokio::test]
    async fn test_reopening_without_seats_is_conflict() {
        let lc = BookingLifecycle::new(
            FakeLedger::with(vec![stored_booking(CODE, BookingStatus::Cancel)], 1, 20),
            FakeGateway::default(),
        );

        let err = lc
            .apply_notification(&CODE.to_string(), "settlement", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(lc.ledger.status_of(CODE), BookingStatus::Cancel);
        assert_eq!(lc.ledger.available(), 1);
    }

    #[tokio::test]
    async fn test_notification_for_unknown_order_is_not_found() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());

        let err = lc
            .apply_notification("42", "settlement", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_non_numeric_order_id_is_bad_request() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());

        let err = lc
            .apply_notification("ORDER-17", "settlement", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(lc.ledger.status_of(CODE), BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_unmapped_status_is_ignored() {
        let lc = lifecycle(BookingStatus::Pending, FakeGateway::default());

        let outcome = lc
            .apply_notification(&CODE.to_string(), "authorize", Utc::now())
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(lc.ledger.status_of(CODE), BookingStatus::Pending);
    }
}
