pub mod airline;
pub mod booking;
pub mod booking_detail;
pub mod facility;
pub mod location;
pub mod payment;
pub mod review;
pub mod tour;
pub mod tour_facility;
pub mod user;
