use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::payment::PaymentGateway;
use crate::repository::booking::{Booking, BookingRepository, BookingRequest, BookingStore, Passenger};
use crate::utils::validation::{invalid, required_id, required_text};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerInput {
    pub document_number: Option<String>,
    pub greeting: Option<String>,
    pub name: Option<String>,
    pub nationality: Option<String>,
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateBookingInput {
    pub tour_id: Option<i32>,
    pub user_id: Option<i32>,
    pub details: Vec<PassengerInput>,
    pub payment_method: String,
}

/// Check a creation request, stopping at the first failing rule.
pub fn validate_booking(input: CreateBookingInput) -> AppResult<BookingRequest> {
    let tour_id = required_id(input.tour_id, "tour id")?;
    let user_id = required_id(input.user_id, "user id")?;

    if input.details.is_empty() {
        return Err(invalid("passenger data"));
    }

    let passengers = input
        .details
        .into_iter()
        .map(|d| -> AppResult<Passenger> {
            Ok(Passenger {
                document_number: required_text(d.document_number, "document number")?,
                greeting: required_text(d.greeting, "greeting")?,
                name: required_text(d.name, "name")?,
                nationality: required_text(d.nationality, "nationality")?,
                dob: d.dob.ok_or_else(|| invalid("date of birth"))?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(BookingRequest {
        tour_id,
        user_id,
        passengers,
        payment_method: input.payment_method,
    })
}

pub struct BookingService<S, G> {
    repository: BookingRepository<S, G>,
}

impl<S: BookingStore, G: PaymentGateway> BookingService<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self {
            repository: BookingRepository::new(store, gateway),
        }
    }

    pub async fn create(&self, input: CreateBookingInput) -> AppResult<Booking> {
        let request = validate_booking(input)?;
        self.repository.create(request, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repository::booking::fakes::{store, FakeGateway, FakeStore};

    fn passenger() -> PassengerInput {
        PassengerInput {
            document_number: Some("3174012345".to_string()),
            greeting: Some("Mrs".to_string()),
            name: Some("Sari Dewi".to_string()),
            nationality: Some("Indonesia".to_string()),
            dob: NaiveDate::from_ymd_opt(1988, 2, 3),
        }
    }

    fn input() -> CreateBookingInput {
        CreateBookingInput {
            tour_id: Some(7),
            user_id: Some(12),
            details: vec![passenger(), passenger()],
            payment_method: "bri".to_string(),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input() {
        let request = validate_booking(input()).unwrap();
        assert_eq!(request.tour_id, 7);
        assert_eq!(request.user_id, 12);
        assert_eq!(request.passengers.len(), 2);
        assert_eq!(request.passengers[0].greeting, "Mrs");
    }

    #[test]
    fn test_tour_id_checked_first() {
        let bad = CreateBookingInput {
            tour_id: Some(0),
            user_id: None,
            details: vec![],
            ..input()
        };
        assert!(message(validate_booking(bad).unwrap_err()).contains("tour id"));
    }

    #[test]
    fn test_user_id_required() {
        let bad = CreateBookingInput {
            user_id: None,
            ..input()
        };
        assert!(message(validate_booking(bad).unwrap_err()).contains("user id"));
    }

    #[test]
    fn test_empty_passenger_list() {
        let bad = CreateBookingInput {
            details: vec![],
            payment_method: "not-a-bank".to_string(),
            ..input()
        };
        assert!(message(validate_booking(bad).unwrap_err()).contains("passenger data"));
    }

    #[test]
    fn test_each_passenger_field_is_named() {
        for field in ["document number", "greeting", "name", "nationality", "date of birth"] {
            let mut p = passenger();
            match field {
                "document number" => p.document_number = None,
                "greeting" => p.greeting = Some("  ".to_string()),
                "name" => p.name = Some(String::new()),
                "nationality" => p.nationality = None,
                _ => p.dob = None,
            }
            let bad = CreateBookingInput {
                details: vec![passenger(), p],
                ..input()
            };
            let msg = message(validate_booking(bad).unwrap_err());
            assert_eq!(msg, format!("please fill {} correctly", field));
        }
    }

    #[test]
    fn test_fields_checked_in_order() {
        let p = PassengerInput {
            greeting: None,
            dob: None,
            ..passenger()
        };
        let bad = CreateBookingInput {
            details: vec![p],
            ..input()
        };
        assert!(message(validate_booking(bad).unwrap_err()).contains("greeting"));
    }

    #[tokio::test]
    async fn test_invalid_tour_never_reaches_store_or_gateway() {
        let service = BookingService::new(store(), FakeGateway::default());

        let err = service
            .create(CreateBookingInput {
                tour_id: Some(0),
                ..input()
            })
            .await
            .unwrap_err();

        assert!(message(err).contains("tour id"));
        let (store, gateway) = service.repository.parts();
        assert_eq!(*store.lookups.lock().unwrap(), 0);
        assert!(gateway.charges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_runs_full_workflow() {
        let service: BookingService<FakeStore, FakeGateway> =
            BookingService::new(store(), FakeGateway::default());

        let booking = service.create(input()).await.unwrap();

        assert_eq!(booking.total, 1_805_000.0);
        assert!(booking.payment.virtual_number.is_some());
    }
}
