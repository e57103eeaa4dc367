use std::time::Duration;

use super::gateway::{ChargeRequest, ChargeResponse, PaymentGateway};
use crate::error::{AppError, AppResult};

/// Core API client for the payment gateway.
#[derive(Clone)]
pub struct MidtransClient {
    http: reqwest::Client,
    base_url: String,
    server_key: String,
}

impl MidtransClient {
    pub fn new(base_url: impl Into<String>, server_key: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build payment client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            server_key: server_key.into(),
        })
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> AppResult<ChargeResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .post(&url)
            .basic_auth(&self.server_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Payment gateway request failed");
            AppError::PaymentGateway(format!("payment gateway unreachable: {}", e))
        })?;

        response
            .json::<ChargeResponse>()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("invalid payment gateway response: {}", e)))
    }
}

impl PaymentGateway for MidtransClient {
    async fn charge(&self, request: &ChargeRequest) -> AppResult<ChargeResponse> {
        self.post("/v2/charge", Some(request)).await
    }

    async fn cancel_transaction(&self, order_id: &str) -> AppResult<()> {
        let response = self
            .post::<()>(&format!("/v2/{}/cancel", order_id), None)
            .await?;

        if !response.is_success() {
            return Err(AppError::PaymentGateway(response.status_message));
        }

        Ok(())
    }
}
