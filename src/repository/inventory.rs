//! Seat accounting for booking status changes.
//!
//! A booking holds its passengers' seats in every status except `cancel`
//! and `refunded`. Moving between the two groups either returns the seats
//! to the tour or takes them again.

use crate::entities::booking::BookingStatus;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatMove {
    Keep,
    Release,
    Take,
}

impl SeatMove {
    pub fn between(from: BookingStatus, to: BookingStatus) -> Self {
        match (from.releases_seats(), to.releases_seats()) {
            (false, true) => SeatMove::Release,
            (true, false) => SeatMove::Take,
            _ => SeatMove::Keep,
        }
    }

    /// New `available` count for a tour after moving `seats` seats.
    pub fn apply(self, available: i32, quota: i32, seats: i32) -> AppResult<i32> {
        match self {
            SeatMove::Keep => Ok(available),
            SeatMove::Release => {
                let released = available + seats;
                if released > quota {
                    return Err(AppError::Conflict(format!(
                        "Releasing {} seats would exceed the tour quota of {}",
                        seats, quota
                    )));
                }
                Ok(released)
            }
            SeatMove::Take => {
                if available < seats {
                    return Err(AppError::Conflict(format!(
                        "Only {} seats available",
                        available
                    )));
                }
                Ok(available - seats)
            }
        }
    }
}
