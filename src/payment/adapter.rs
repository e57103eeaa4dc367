//! Translation between a booking and a gateway charge.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use super::gateway::{
    Bank, BankTransfer, ChargeRequest, ChargeResponse, CustomerDetails, Echannel, ItemDetail,
    PaymentGateway, TransactionDetails,
};
use crate::error::{AppError, AppResult};
use crate::repository::booking::{NewBooking, PaymentRecord};

const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Gateway timestamps are in Western Indonesia Time (UTC+7).
const GATEWAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Build the charge for a booking.
///
/// Line items split the integer total evenly across passengers with
/// truncating division, so their sum can fall short of `gross_amount`.
pub fn build_charge_request(booking: &NewBooking, bank: Bank) -> AppResult<ChargeRequest> {
    if booking.details.is_empty() {
        return Err(AppError::Validation(
            "please fill passenger data correctly".to_string(),
        ));
    }

    let order_id = booking.code.to_string();
    let gross_amount = booking.total as i64;
    let unit_price = gross_amount / booking.details.len() as i64;

    let item_details = booking
        .details
        .iter()
        .map(|p| ItemDetail {
            id: p.document_number.clone(),
            name: format!("{} {}", p.greeting, p.name),
            price: unit_price,
            quantity: 1,
        })
        .collect();

    let (bank_transfer, echannel) = match bank {
        Bank::Mandiri => (
            None,
            Some(Echannel {
                bill_info1: "Payment For:".to_string(),
                bill_info2: format!("Tour booking {}", booking.tour.title),
                bill_key: order_id.clone(),
            }),
        ),
        other => (
            Some(BankTransfer {
                bank: other.code().to_string(),
            }),
            None,
        ),
    };

    Ok(ChargeRequest {
        payment_type: bank.payment_type().to_string(),
        transaction_details: TransactionDetails {
            order_id,
            gross_amount,
        },
        customer_details: CustomerDetails {
            first_name: booking.user.name.clone(),
            email: booking.user.email.clone(),
            phone: booking.user.phone.clone(),
        },
        item_details,
        bank_transfer,
        echannel,
    })
}

pub fn parse_expiry(raw: &str) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS)?;
    NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT)
        .ok()?
        .and_local_timezone(offset)
        .single()
}

/// Turn a gateway response into the payment record stored with the booking.
pub fn payment_from_response(
    bank: Bank,
    total: f64,
    response: ChargeResponse,
    now: DateTime<Utc>,
) -> AppResult<PaymentRecord> {
    if !response.is_success() {
        return Err(AppError::PaymentGateway(response.status_message));
    }

    let expired_at = match response.expiry_time.as_deref() {
        Some(raw) => {
            let parsed = parse_expiry(raw);
            if parsed.is_none() {
                tracing::warn!(expiry_time = %raw, "Unparseable payment expiry");
            }
            parsed
        }
        None => None,
    };

    let mut payment = PaymentRecord {
        method: response
            .payment_type
            .unwrap_or_else(|| bank.payment_type().to_string()),
        bank: bank.code().to_string(),
        virtual_number: None,
        bill_key: None,
        bill_code: None,
        status: response
            .transaction_status
            .unwrap_or_else(|| "pending".to_string()),
        total,
        created_at: now,
        expired_at,
        paid_at: None,
    };

    if let Some(va) = response.va_numbers.and_then(|v| v.into_iter().next()) {
        payment.virtual_number = Some(va.va_number);
    } else if let Some(bill_key) = response.bill_key {
        payment.bill_key = Some(bill_key);
        payment.bill_code = response.biller_code;
    } else if let Some(permata) = response.permata_va_number {
        payment.virtual_number = Some(permata);
    }

    Ok(payment)
}

/// Charge the gateway for a booking. Nothing is persisted here.
pub async fn charge_booking<G: PaymentGateway>(
    gateway: &G,
    booking: &NewBooking,
    payment_method: &str,
    now: DateTime<Utc>,
) -> AppResult<PaymentRecord> {
    let bank: Bank = payment_method.parse()?;
    let request = build_charge_request(booking, bank)?;
    let response = gateway.charge(&request).await?;

    if !response.is_success() {
        tracing::warn!(
            order_id = %request.transaction_details.order_id,
            status_code = %response.status_code,
            message = %response.status_message,
            "Payment gateway rejected charge"
        );
    }

    payment_from_response(bank, booking.total, response, now)
}
