use crate::error::{AppError, AppResult};

/// Total charged for a booking.
///
/// The discount is a whole percentage applied to every passenger seat; the
/// admin fee is charged once per booking.
pub fn calculate_total(passengers: usize, price: f64, discount_percent: i32, admin_fee: f64) -> f64 {
    let n = passengers as f64;
    n * price - (discount_percent as f64 / 100.0 * price * n) + admin_fee
}

/// Booking code: decimal concatenation of user id, tour id and unix seconds.
///
/// Two bookings by the same user for the same tour within one second
/// collide; the primary key on `booking.code` rejects the second write.
pub fn generate_booking_code(user_id: i32, tour_id: i32, unix_seconds: i64) -> AppResult<i64> {
    format!("{}{}{}", user_id, tour_id, unix_seconds)
        .parse()
        .map_err(|e| AppError::Internal(format!("Failed to generate booking code: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_two_passengers_with_discount() {
        let total = calculate_total(2, 1_000_000.0, 10, 5_000.0);
        assert_eq!(total, 1_805_000.0);
    }

    #[test]
    fn test_admin_fee_charged_once() {
        let one = calculate_total(1, 100.0, 0, 25.0);
        let three = calculate_total(3, 100.0, 0, 25.0);
        assert_eq!(one, 125.0);
        assert_eq!(three, 325.0);
    }

    #[test]
    fn test_total_matches_formula() {
        for &(n, p, d, f) in &[
            (1usize, 0.0, 0, 0.0),
            (4, 250_000.0, 100, 10_000.0),
            (7, 1_234_567.0, 33, 2_500.0),
            (12, 99.99, 5, 0.5),
        ] {
            let nf = n as f64;
            let expected = nf * p - (d as f64 / 100.0) * p * nf + f;
            assert_eq!(calculate_total(n, p, d, f), expected);
        }
    }

    #[test]
    fn test_full_discount_leaves_admin_fee() {
        assert_eq!(calculate_total(3, 500.0, 100, 15.0), 15.0);
    }

    #[test]
    fn test_booking_code_concatenates() {
        let code = generate_booking_code(12, 7, 1_700_000_000).unwrap();
        assert_eq!(code, 1271_700_000_000);
    }

    #[test]
    fn test_booking_code_is_deterministic() {
        let a = generate_booking_code(3, 45, 1_699_999_999).unwrap();
        let b = generate_booking_code(3, 45, 1_699_999_999).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "3451699999999");
    }

    #[test]
    fn test_booking_code_overflow_is_error() {
        let err = generate_booking_code(i32::MAX, i32::MAX, 1_700_000_000).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
