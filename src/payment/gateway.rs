use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Banks accepted for payment. Every bank except Mandiri is charged as a
/// virtual-account bank transfer; Mandiri uses bill payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Bca,
    Bni,
    Bri,
    Permata,
    Mandiri,
}

impl Bank {
    pub fn code(self) -> &'static str {
        match self {
            Bank::Bca => "bca",
            Bank::Bni => "bni",
            Bank::Bri => "bri",
            Bank::Permata => "permata",
            Bank::Mandiri => "mandiri",
        }
    }

    pub fn payment_type(self) -> &'static str {
        match self {
            Bank::Mandiri => "echannel",
            _ => "bank_transfer",
        }
    }
}

impl FromStr for Bank {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bca" => Ok(Bank::Bca),
            "bni" => Ok(Bank::Bni),
            "bri" => Ok(Bank::Bri),
            "permata" => Ok(Bank::Permata),
            "mandiri" => Ok(Bank::Mandiri),
            other => Err(AppError::UnsupportedPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeRequest {
    pub payment_type: String,
    pub transaction_details: TransactionDetails,
    pub customer_details: CustomerDetails,
    pub item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transfer: Option<BankTransfer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echannel: Option<Echannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankTransfer {
    pub bank: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Echannel {
    pub bill_info1: String,
    pub bill_info2: String,
    pub bill_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VaNumber {
    pub bank: String,
    pub va_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChargeResponse {
    pub status_code: String,
    pub status_message: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub va_numbers: Option<Vec<VaNumber>>,
    #[serde(default)]
    pub permata_va_number: Option<String>,
    #[serde(default)]
    pub bill_key: Option<String>,
    #[serde(default)]
    pub biller_code: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, gateway local time.
    #[serde(default)]
    pub expiry_time: Option<String>,
}

impl ChargeResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status_code.as_str(), "200" | "201")
    }
}

/// Outbound calls to the payment gateway.
pub trait PaymentGateway: Send + Sync {
    fn charge(
        &self,
        request: &ChargeRequest,
    ) -> impl Future<Output = AppResult<ChargeResponse>> + Send;

    fn cancel_transaction(&self, order_id: &str) -> impl Future<Output = AppResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_banks() {
        for code in ["bca", "bni", "bri", "permata", "mandiri"] {
            let bank: Bank = code.parse().unwrap();
            assert_eq!(bank.code(), code);
        }
    }

    #[test]
    fn test_unsupported_bank() {
        let err = "gopay".parse::<Bank>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedPaymentMethod(ref m) if m == "gopay"));
        assert!("BCA".parse::<Bank>().is_err());
    }

    #[test]
    fn test_mandiri_uses_bill_payment() {
        assert_eq!(Bank::Mandiri.payment_type(), "echannel");
        assert_eq!(Bank::Permata.payment_type(), "bank_transfer");
    }

    #[test]
    fn test_response_defaults_missing_fields() {
        let response: ChargeResponse = serde_json::from_str(
            r#"{"status_code":"406","status_message":"Duplicate order ID"}"#,
        )
        .unwrap();
        assert!(!response.is_success());
        assert!(response.va_numbers.is_none());
    }
}
