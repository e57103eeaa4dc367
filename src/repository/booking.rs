//! Booking persistence and the booking-creation workflow.
//!
//! Creation is a linear sequence: load tour and user, price the booking,
//! derive its code, charge the gateway, then write the aggregate. Any step
//! failing aborts the rest. A charge that succeeds before a failed write is
//! left for manual reconciliation.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::booking::BookingStatus;
use crate::entities::{booking, booking_detail, payment, tour, user};
use crate::error::{AppError, AppResult};
use crate::payment::adapter::charge_booking;
use crate::payment::PaymentGateway;
use crate::repository::inventory::SeatMove;
use crate::utils::pricing::{calculate_total, generate_booking_code};
use crate::utils::validation::invalid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    pub document_number: String,
    pub greeting: String,
    pub name: String,
    pub nationality: String,
    pub dob: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub method: String,
    pub bank: String,
    pub virtual_number: Option<String>,
    pub bill_key: Option<String>,
    pub bill_code: Option<String>,
    pub status: String,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<FixedOffset>>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Validated input for booking creation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub tour_id: i32,
    pub user_id: i32,
    pub passengers: Vec<Passenger>,
    pub payment_method: String,
}

/// A priced booking that has not been charged yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub code: i64,
    pub total: f64,
    pub booked_at: DateTime<Utc>,
    pub user: user::Model,
    pub tour: tour::Model,
    pub details: Vec<Passenger>,
}

/// Booking aggregate: the booking, its passengers and its payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub code: i64,
    pub total: f64,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
    pub user: user::Model,
    pub tour: tour::Model,
    pub details: Vec<Passenger>,
    pub payment: PaymentRecord,
}

impl Booking {
    fn charged(new: NewBooking, payment: PaymentRecord) -> Self {
        Self {
            code: new.code,
            total: new.total,
            status: BookingStatus::Pending,
            booked_at: new.booked_at,
            user: new.user,
            tour: new.tour,
            details: new.details,
            payment,
        }
    }
}

/// Storage operations the creation workflow depends on.
pub trait BookingStore: Send + Sync {
    fn find_tour_by_id(&self, id: i32) -> impl Future<Output = AppResult<tour::Model>> + Send;

    fn find_user_by_id(&self, id: i32) -> impl Future<Output = AppResult<user::Model>> + Send;

    /// Write booking, passengers and payment in one transaction, taking the
    /// passengers' seats from the tour.
    fn create_booking_aggregate(
        &self,
        booking: Booking,
    ) -> impl Future<Output = AppResult<Booking>> + Send;
}

/// Reads and status changes on stored bookings.
pub trait BookingLedger: Send + Sync {
    fn find_by_code(&self, code: i64) -> impl Future<Output = AppResult<Booking>> + Send;

    /// Move a booking to `status`, recording the gateway status when given.
    /// Seats go back to the tour when the booking enters `cancel` or
    /// `refunded` and are taken again when it leaves them.
    fn update_status(
        &self,
        code: i64,
        status: BookingStatus,
        payment_status: Option<String>,
        now: DateTime<Utc>,
    ) -> impl Future<Output = AppResult<Booking>> + Send;
}

pub struct BookingRepository<S, G> {
    store: S,
    gateway: G,
}

impl<S: BookingStore, G: PaymentGateway> BookingRepository<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    pub async fn create(&self, request: BookingRequest, now: DateTime<Utc>) -> AppResult<Booking> {
        let tour = self.store.find_tour_by_id(request.tour_id).await?;
        let user = self.store.find_user_by_id(request.user_id).await?;

        let passengers = request.passengers.len();
        let seats = i32::try_from(passengers).map_err(|_| invalid("passenger data"))?;
        if tour.available < seats {
            return Err(AppError::Conflict(format!(
                "Only {} seats available",
                tour.available
            )));
        }

        let total = calculate_total(passengers, tour.price, tour.discount, tour.admin_fee);
        let code = generate_booking_code(user.id, tour.id, now.timestamp())?;

        let new_booking = NewBooking {
            code,
            total,
            booked_at: now,
            user,
            tour,
            details: request.passengers,
        };

        let payment =
            charge_booking(&self.gateway, &new_booking, &request.payment_method, now).await?;
        tracing::info!(code, total, bank = %payment.bank, "Payment charge issued");

        let booking = self
            .store
            .create_booking_aggregate(Booking::charged(new_booking, payment))
            .await
            .inspect_err(|e| {
                tracing::error!(code, error = %e, "Booking write failed after successful charge");
            })?;
        tracing::info!(code, "Booking persisted");

        Ok(booking)
    }

    #[cfg(test)]
    pub(crate) fn parts(&self) -> (&S, &G) {
        (&self.store, &self.gateway)
    }
}

// ============ Database Store ============

#[derive(Clone)]
pub struct DbBookingStore {
    db: DatabaseConnection,
}

impl DbBookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        let records = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::BookedAt)
            .all(&self.db)
            .await?;
        assemble(&self.db, records).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<Booking>> {
        let records = booking::Entity::find()
            .order_by_desc(booking::Column::BookedAt)
            .all(&self.db)
            .await?;
        assemble(&self.db, records).await
    }
}

impl BookingLedger for DbBookingStore {
    async fn find_by_code(&self, code: i64) -> AppResult<Booking> {
        let record = booking::Entity::find_by_id(code)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        assemble(&self.db, vec![record])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Booking aggregate is incomplete".to_string()))
    }

    async fn update_status(
        &self,
        code: i64,
        status: BookingStatus,
        payment_status: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let txn = self.db.begin().await?;

        // Row locks serialize concurrent notifications for the same booking
        // and any other writer of the tour's seat count.
        let record = booking::Entity::find_by_id(code)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let seat_move = SeatMove::between(record.status, status);
        if seat_move != SeatMove::Keep {
            let seats = booking_detail::Entity::find()
                .filter(booking_detail::Column::BookingCode.eq(code))
                .count(&txn)
                .await?;
            let seats = i32::try_from(seats)
                .map_err(|_| AppError::Internal(format!("Booking {} has too many seats", code)))?;

            let tour = tour::Entity::find_by_id(record.tour_id)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;
            let available = seat_move.apply(tour.available, tour.quota, seats)?;

            let mut active: tour::ActiveModel = tour.into();
            active.available = Set(available);
            active.update(&txn).await?;
            tracing::debug!(code, seats, available, move_kind = ?seat_move, "Tour seats adjusted");
        }

        let mut active: booking::ActiveModel = record.into();
        active.status = Set(status);
        active.update(&txn).await?;

        if let Some(pay) = payment::Entity::find()
            .filter(payment::Column::BookingCode.eq(code))
            .one(&txn)
            .await?
        {
            let mut active: payment::ActiveModel = pay.into();
            if let Some(payment_status) = payment_status {
                active.status = Set(payment_status);
            }
            if status == BookingStatus::Approved {
                active.paid_at = Set(Some(now.fixed_offset()));
            }
            active.update(&txn).await?;
        }

        txn.commit().await?;
        self.find_by_code(code).await
    }
}

impl BookingStore for DbBookingStore {
    async fn find_tour_by_id(&self, id: i32) -> AppResult<tour::Model> {
        tour::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))
    }

    async fn find_user_by_id(&self, id: i32) -> AppResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn create_booking_aggregate(&self, booking: Booking) -> AppResult<Booking> {
        let seats = booking.details.len() as i32;
        let txn = self.db.begin().await?;

        let taken = tour::Entity::update_many()
            .col_expr(
                tour::Column::Available,
                Expr::col(tour::Column::Available).sub(seats),
            )
            .filter(tour::Column::Id.eq(booking.tour.id))
            .filter(tour::Column::Available.gte(seats))
            .exec(&txn)
            .await?;

        if taken.rows_affected == 0 {
            return Err(AppError::Conflict("Tour quota is full".to_string()));
        }

        booking::ActiveModel {
            code: Set(booking.code),
            tour_id: Set(booking.tour.id),
            user_id: Set(booking.user.id),
            total: Set(booking.total),
            status: Set(booking.status),
            booked_at: Set(booking.booked_at.fixed_offset()),
        }
        .insert(&txn)
        .await?;

        let details = booking.details.iter().map(|p| booking_detail::ActiveModel {
            booking_code: Set(booking.code),
            document_number: Set(p.document_number.clone()),
            greeting: Set(p.greeting.clone()),
            name: Set(p.name.clone()),
            nationality: Set(p.nationality.clone()),
            dob: Set(p.dob),
            ..Default::default()
        });
        booking_detail::Entity::insert_many(details).exec(&txn).await?;

        let pay = &booking.payment;
        payment::ActiveModel {
            booking_code: Set(booking.code),
            method: Set(pay.method.clone()),
            bank: Set(pay.bank.clone()),
            virtual_number: Set(pay.virtual_number.clone()),
            bill_key: Set(pay.bill_key.clone()),
            bill_code: Set(pay.bill_code.clone()),
            status: Set(pay.status.clone()),
            total: Set(pay.total),
            created_at: Set(pay.created_at.fixed_offset()),
            expired_at: Set(pay.expired_at),
            paid_at: Set(pay.paid_at.map(|t| t.fixed_offset())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        let mut booking = booking;
        booking.tour.available -= seats;
        Ok(booking)
    }
}

impl From<booking_detail::Model> for Passenger {
    fn from(d: booking_detail::Model) -> Self {
        Self {
            document_number: d.document_number,
            greeting: d.greeting,
            name: d.name,
            nationality: d.nationality,
            dob: d.dob,
        }
    }
}

impl From<payment::Model> for PaymentRecord {
    fn from(p: payment::Model) -> Self {
        Self {
            method: p.method,
            bank: p.bank,
            virtual_number: p.virtual_number,
            bill_key: p.bill_key,
            bill_code: p.bill_code,
            status: p.status,
            total: p.total,
            created_at: p.created_at.with_timezone(&Utc),
            expired_at: p.expired_at,
            paid_at: p.paid_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Load tours, users, passengers and payments for a batch of bookings.
async fn assemble<C: ConnectionTrait>(
    conn: &C,
    records: Vec<booking::Model>,
) -> AppResult<Vec<Booking>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let codes: Vec<i64> = records.iter().map(|b| b.code).collect();
    let tour_ids: Vec<i32> = records.iter().map(|b| b.tour_id).collect();
    let user_ids: Vec<i32> = records.iter().map(|b| b.user_id).collect();

    let tours: HashMap<i32, tour::Model> = tour::Entity::find()
        .filter(tour::Column::Id.is_in(tour_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();
    let users: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut details: HashMap<i64, Vec<Passenger>> = HashMap::new();
    for d in booking_detail::Entity::find()
        .filter(booking_detail::Column::BookingCode.is_in(codes.clone()))
        .order_by_asc(booking_detail::Column::Id)
        .all(conn)
        .await?
    {
        details.entry(d.booking_code).or_default().push(d.into());
    }

    let mut payments: HashMap<i64, PaymentRecord> = payment::Entity::find()
        .filter(payment::Column::BookingCode.is_in(codes))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.booking_code, p.into()))
        .collect();

    records
        .into_iter()
        .map(|b| {
            let missing = || AppError::Internal(format!("Booking {} is incomplete", b.code));
            Ok(Booking {
                code: b.code,
                total: b.total,
                status: b.status,
                booked_at: b.booked_at.with_timezone(&Utc),
                tour: tours.get(&b.tour_id).cloned().ok_or_else(missing)?,
                user: users.get(&b.user_id).cloned().ok_or_else(missing)?,
                details: details.remove(&b.code).unwrap_or_default(),
                payment: payments.remove(&b.code).ok_or_else(missing)?,
            })
        })
        .collect()
}


#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;

    use super::*;
    use crate::payment::{ChargeRequest, ChargeResponse};
    use crate::payment::gateway::VaNumber;

    #[derive(Default)]
    pub struct FakeStore {
        pub tours: Vec<tour::Model>,
        pub users: Vec<user::Model>,
        pub persisted: Mutex<Vec<Booking>>,
        pub fail_persist: bool,
        pub lookups: Mutex<usize>,
    }

    impl BookingStore for FakeStore {
        async fn find_tour_by_id(&self, id: i32) -> AppResult<tour::Model> {
            *self.lookups.lock().unwrap() += 1;
            self.tours
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))
        }

        async fn find_user_by_id(&self, id: i32) -> AppResult<user::Model> {
            *self.lookups.lock().unwrap() += 1;
            self.users
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))
        }

        async fn create_booking_aggregate(&self, booking: Booking) -> AppResult<Booking> {
            if self.fail_persist {
                return Err(AppError::Internal("connection reset".to_string()));
            }
            self.persisted.lock().unwrap().push(booking.clone());
            Ok(booking)
        }
    }

    /// Echoes the charge back the way the gateway does for each bank.
    #[derive(Default)]
    pub struct FakeGateway {
        pub reject_with: Option<String>,
        pub charges: Mutex<Vec<ChargeRequest>>,
        pub refuse_cancel: Option<String>,
        pub cancelled: Mutex<Vec<String>>,
    }

    impl PaymentGateway for FakeGateway {
        async fn charge(&self, request: &ChargeRequest) -> AppResult<ChargeResponse> {
            self.charges.lock().unwrap().push(request.clone());

            if let Some(message) = &self.reject_with {
                return Ok(ChargeResponse {
                    status_code: "406".to_string(),
                    status_message: message.clone(),
                    ..Default::default()
                });
            }

            let mut response = ChargeResponse {
                status_code: "201".to_string(),
                status_message: "Success".to_string(),
                order_id: Some(request.transaction_details.order_id.clone()),
                payment_type: Some(request.payment_type.clone()),
                transaction_status: Some("pending".to_string()),
                expiry_time: Some("2024-10-02 10:30:00".to_string()),
                ..Default::default()
            };
            if let Some(echannel) = &request.echannel {
                response.bill_key = Some(echannel.bill_key.clone());
                response.biller_code = Some("70012".to_string());
            } else if let Some(transfer) = &request.bank_transfer {
                response.va_numbers = Some(vec![VaNumber {
                    bank: transfer.bank.clone(),
                    va_number: "988001234567".to_string(),
                }]);
            }
            Ok(response)
        }

        async fn cancel_transaction(&self, order_id: &str) -> AppResult<()> {
            if let Some(message) = &self.refuse_cancel {
                return Err(AppError::PaymentGateway(message.clone()));
            }
            self.cancelled.lock().unwrap().push(order_id.to_string());
            Ok(())
        }
    }

    /// Stored bookings for one tour, with the tour's seat count kept the
    /// way the database store keeps it.
    pub struct FakeLedger {
        pub bookings: Mutex<HashMap<i64, Booking>>,
        pub available: Mutex<i32>,
        pub quota: i32,
    }

    impl FakeLedger {
        pub fn with(bookings: Vec<Booking>, available: i32, quota: i32) -> Self {
            Self {
                bookings: Mutex::new(bookings.into_iter().map(|b| (b.code, b)).collect()),
                available: Mutex::new(available),
                quota,
            }
        }

        pub fn status_of(&self, code: i64) -> BookingStatus {
            self.bookings.lock().unwrap()[&code].status
        }

        pub fn available(&self) -> i32 {
            *self.available.lock().unwrap()
        }
    }

    impl BookingLedger for FakeLedger {
        async fn find_by_code(&self, code: i64) -> AppResult<Booking> {
            self.bookings
                .lock()
                .unwrap()
                .get(&code)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
        }

        async fn update_status(
            &self,
            code: i64,
            status: BookingStatus,
            payment_status: Option<String>,
            now: DateTime<Utc>,
        ) -> AppResult<Booking> {
            let mut bookings = self.bookings.lock().unwrap();
            let booking = bookings
                .get_mut(&code)
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

            let mut available = self.available.lock().unwrap();
            *available = SeatMove::between(booking.status, status).apply(
                *available,
                self.quota,
                booking.details.len() as i32,
            )?;

            booking.status = status;
            booking.tour.available = *available;
            if let Some(payment_status) = payment_status {
                booking.payment.status = payment_status;
            }
            if status == BookingStatus::Approved {
                booking.payment.paid_at = Some(now);
            }
            Ok(booking.clone())
        }
    }

    /// A stored two-passenger booking owned by the sample user.
    pub fn stored_booking(code: i64, status: BookingStatus) -> Booking {
        let new = super::test_support::sample_booking(2, 1_805_000.0);
        let payment = PaymentRecord {
            method: "bank_transfer".to_string(),
            bank: "bri".to_string(),
            virtual_number: Some("988001234567".to_string()),
            bill_key: None,
            bill_code: None,
            status: "pending".to_string(),
            total: new.total,
            created_at: new.booked_at,
            expired_at: None,
            paid_at: None,
        };
        Booking {
            code,
            status,
            ..Booking::charged(new, payment)
        }
    }

    pub fn store() -> FakeStore {
        FakeStore {
            tours: vec![super::test_support::sample_tour()],
            users: vec![super::test_support::sample_user()],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{store, FakeGateway};
    use super::test_support::sample_passenger;
    use super::*;

    fn request(passengers: usize, bank: &str) -> BookingRequest {
        BookingRequest {
            tour_id: 7,
            user_id: 12,
            passengers: (0..passengers)
                .map(|i| sample_passenger(&format!("P{}", i)))
                .collect(),
            payment_method: bank.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bri_booking_gets_virtual_account() {
        let repo = BookingRepository::new(store(), FakeGateway::default());

        let booking = repo.create(request(2, "bri"), now()).await.unwrap();

        assert_eq!(booking.total, 1_805_000.0);
        assert_eq!(booking.code, 1271_700_000_000);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment.virtual_number.as_deref(), Some("988001234567"));
        assert!(booking.payment.bill_key.is_none());
        assert_eq!(booking.details.len(), 2);
        assert_eq!(repo.store.persisted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mandiri_booking_bill_key_is_code() {
        let repo = BookingRepository::new(store(), FakeGateway::default());

        let booking = repo.create(request(2, "mandiri"), now()).await.unwrap();

        assert_eq!(booking.payment.bill_key, Some(booking.code.to_string()));
        assert!(booking.payment.virtual_number.is_none());
        assert_eq!(booking.total, 1_805_000.0);
    }

    #[tokio::test]
    async fn test_gateway_rejection_persists_nothing() {
        let gateway = FakeGateway {
            reject_with: Some("Bank is not available".to_string()),
            ..Default::default()
        };
        let repo = BookingRepository::new(store(), gateway);

        let err = repo.create(request(1, "bca"), now()).await.unwrap_err();

        assert!(matches!(err, AppError::PaymentGateway(ref m) if m == "Bank is not available"));
        assert!(repo.store.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_bank_fails_before_charge_and_write() {
        let repo = BookingRepository::new(store(), FakeGateway::default());

        let err = repo.create(request(1, "ovo"), now()).await.unwrap_err();

        assert!(matches!(err, AppError::UnsupportedPaymentMethod(_)));
        assert!(repo.gateway.charges.lock().unwrap().is_empty());
        assert!(repo.store.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_tour_is_not_found() {
        let repo = BookingRepository::new(store(), FakeGateway::default());
        let mut req = request(1, "bca");
        req.tour_id = 99;

        let err = repo.create(req, now()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.gateway.charges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let repo = BookingRepository::new(store(), FakeGateway::default());
        let mut req = request(1, "bca");
        req.user_id = 404;

        let err = repo.create(req, now()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m.contains("User")));
    }

    #[tokio::test]
    async fn test_not_enough_seats_is_conflict() {
        let mut fake = store();
        fake.tours[0].available = 1;
        let repo = BookingRepository::new(fake, FakeGateway::default());

        let err = repo.create(request(2, "bni"), now()).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(repo.gateway.charges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_seat_count_is_conflict() {
        let mut fake = store();
        fake.tours[0].available = -1;
        let repo = BookingRepository::new(fake, FakeGateway::default());

        let err = repo.create(request(1, "bca"), now()).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(repo.gateway.charges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_after_charge_is_returned() {
        let mut fake = store();
        fake.fail_persist = true;
        let repo = BookingRepository::new(fake, FakeGateway::default());

        let err = repo.create(request(1, "permata"), now()).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(repo.gateway.charges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_creation_charges_twice() {
        let repo = BookingRepository::new(store(), FakeGateway::default());

        repo.create(request(1, "bca"), now()).await.unwrap();
        let later = now() + chrono::Duration::seconds(1);
        repo.create(request(1, "bca"), later).await.unwrap();

        assert_eq!(repo.gateway.charges.lock().unwrap().len(), 2);
        let persisted = repo.store.persisted.lock().unwrap();
        assert_eq!(persisted.len(), 2);
        assert_ne!(persisted[0].code, persisted[1].code);
    }
}
