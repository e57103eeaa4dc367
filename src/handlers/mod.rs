pub mod airlines;
pub mod auth;
pub mod bookings;
pub mod facilities;
pub mod locations;
pub mod payments;
pub mod reports;
pub mod reviews;
pub mod tours;
pub mod users;
