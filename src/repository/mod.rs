pub mod booking;
pub mod inventory;
