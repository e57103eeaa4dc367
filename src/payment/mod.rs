//! Payment gateway integration: wire types, the HTTP client, and the
//! translation between bookings and gateway charges.

pub mod adapter;
pub mod gateway;
pub mod midtrans;

pub use gateway::{Bank, ChargeRequest, ChargeResponse, PaymentGateway};
pub use midtrans::MidtransClient;
