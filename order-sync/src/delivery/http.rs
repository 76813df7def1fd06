//! HTTP client for the tracking store

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use shared::{
    AppError, AppResult, Credential, HistoryEntry, OrderStatusUpdate, StatusPayload,
    TrackingRecord,
};
use std::time::Duration;

use super::{Delivery, DeliveryError, TrackingLookup};

/// Tracking store over HTTP
///
/// - `POST {base}/api/tracking/{orderId}` with `{"status": ...}`
/// - `GET  {base}/api/tracking/{orderId}` (404 = no record)
/// - `GET  {base}/api/tracking/{orderId}/history`
#[derive(Debug, Clone)]
pub struct HttpTrackingClient {
    client: Client,
    base_url: String,
}

impl HttpTrackingClient {
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tracking_url(&self, order_id: i64) -> String {
        format!("{}/api/tracking/{}", self.base_url, order_id)
    }

    /// Status history of an order, newest first
    pub async fn history(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> Result<Vec<HistoryEntry>, DeliveryError> {
        let url = format!("{}/history", self.tracking_url(order_id));
        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, credential.header_value())
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| DeliveryError::InvalidResponse(e.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DeliveryError::from_status(status, body))
            }
        }
    }
}

#[async_trait]
impl Delivery for HttpTrackingClient {
    async fn deliver(
        &self,
        update: &OrderStatusUpdate,
        credential: &Credential,
    ) -> Result<(), DeliveryError> {
        let url = self.tracking_url(update.order_id);
        tracing::debug!(order_id = update.order_id, status = %update.status, url = %url, "Delivering status");

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, credential.header_value())
            .json(&StatusPayload {
                status: update.status,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::from_status(status, body))
    }
}

#[async_trait]
impl TrackingLookup for HttpTrackingClient {
    async fn fetch(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> Result<Option<TrackingRecord>, DeliveryError> {
        let response = self
            .client
            .get(self.tracking_url(order_id))
            .header(header::AUTHORIZATION, credential.header_value())
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<TrackingRecord>()
                .await
                .map(Some)
                .map_err(|e| DeliveryError::InvalidResponse(e.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DeliveryError::from_status(status, body))
            }
        }
    }
}
