use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::models::OfferRecord;
use crate::services::store::{OfferStore, StoreError};

/// Columns of the embedded structure needed to place a marker
const OFFER_SELECT: &str = "*,structure:structures(id,name,city,latitude,longitude,is_verified)";

/// Supabase (PostgREST) client for the `offers` table
///
/// Read-only: lists active offers with their structure joined in,
/// newest first.
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseStore {
    /// Create a new Supabase store
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn offers_url(&self) -> String {
        format!(
            "{}/rest/v1/offers?select={}&is_active=eq.true&order=created_at.desc",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(OFFER_SELECT)
        )
    }
}

#[async_trait]
impl OfferStore for SupabaseStore {
    async fn list_active_offers(&self) -> Result<Vec<OfferRecord>, StoreError> {
        let url = self.offers_url();

        tracing::debug!("Fetching active offers from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to list offers: {} - {}", status, body);
            return Err(StoreError::ApiError(format!(
                "Failed to list offers: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        let rows = json
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("Expected an array of offers".into()))?;

        let records: Vec<OfferRecord> = rows
            .iter()
            .filter_map(|row| match serde_json::from_value(row.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    let id = row.get("id").and_then(Value::as_str).unwrap_or("<unknown>");
                    tracing::warn!(offer_id = id, "Skipping undecodable offer row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} offers ({} rows)", records.len(), rows.len());

        Ok(records)
    }
}
