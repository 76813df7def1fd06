//! Order-of-record over HTTP

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use shared::{AppError, AppResult, Credential, OrderStatusRecord};
use std::time::Duration;

use super::OrderRecordSource;

/// Read-only client for the order service
///
/// - `GET {base}/api/orders` - full scan
/// - `GET {base}/api/orders/{orderId}` (404 = unknown order)
#[derive(Debug, Clone)]
pub struct HttpOrderSource {
    client: Client,
    base_url: String,
}

impl HttpOrderSource {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, url: &str, credential: &Credential) -> AppResult<reqwest::Response> {
        self.client
            .get(url)
            .header(header::AUTHORIZATION, credential.header_value())
            .send()
            .await
            .map_err(|e| AppError::order_source_unavailable(format!("Order service request failed: {e}")))
    }
}

async fn error_from(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AppError::order_source_unavailable(format!(
        "Order service answered with status {status}: {body}"
    ))
    .with_detail("http_status", status.as_u16())
}

#[async_trait]
impl OrderRecordSource for HttpOrderSource {
    async fn list_orders(&self, credential: &Credential) -> AppResult<Vec<OrderStatusRecord>> {
        let url = format!("{}/api/orders", self.base_url);
        let response = self.get(&url, credential).await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse order list: {e}")))
    }

    async fn get_order(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> AppResult<Option<OrderStatusRecord>> {
        let url = format!("{}/api/orders/{}", self.base_url, order_id);
        let response = self.get(&url, credential).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| AppError::internal(format!("Failed to parse order {order_id}: {e}"))),
            _ => Err(error_from(response).await),
        }
    }
}
