//! Selling Partner API client implementation.
//!
//! This module provides the HTTP client for the Listings Items API. Access
//! tokens are exchanged with Login with Amazon and cached until shortly
//! before they expire.

use async_trait::async_trait;
use chrono::{DateTime, Duration as TokenLifetime, Utc};
use reqwest::{Client, Method, StatusCode, Url, header};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

use crate::config::MarketplaceSettings;
use crate::error::{ListingError, MarketplaceError, Result};
use crate::listing::{ListingsItemPutRequest, PatchOperation};

use super::types::{AccessTokenResponse, ListingSummary, SubmissionResponse};
use super::ListingsApi;

/// Listings Items API version path.
const LISTINGS_API_PATH: &str = "listings/2021-08-01/items";

/// Header carrying the access token.
const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for retryable failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Seconds shaved off a token's lifetime before it is considered stale.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Data requested when reading a single listing.
const INCLUDED_DATA: &str = "summaries,attributes,issues,offers";

/// A cached access token.
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Selling Partner API client.
#[derive(Debug)]
pub struct SpApiClient {
    /// HTTP client.
    client: Client,
    /// Credentials and endpoints.
    settings: MarketplaceSettings,
    /// Cached access token.
    token: Mutex<Option<AccessToken>>,
    /// Base delay between retries.
    retry_delay: Duration,
}

impl SpApiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: MarketplaceSettings) -> Result<Self> {
        Self::with_timeout(settings, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(settings: MarketplaceSettings, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MarketplaceError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            settings,
            token: Mutex::new(None),
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        })
    }

    /// Overrides the base delay between retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the marketplace this client addresses.
    #[must_use]
    pub fn marketplace_id(&self) -> &str {
        &self.settings.marketplace_id
    }

    /// Returns the currency offers are priced in.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    /// Returns a valid access token, exchanging the refresh token if needed.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        debug!("Requesting a new access token");
        let response = self
            .client
            .post(&self.settings.lwa_endpoint)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.settings.refresh_token.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketplaceError::network(format!("Token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketplaceError::AuthenticationFailed {
                message: format!("token exchange returned {status}: {body}"),
            }
            .into());
        }

        let token: AccessTokenResponse = response.json().await.map_err(|e| {
            MarketplaceError::invalid_response(format!("Failed to parse token response: {e}"))
        })?;

        let lifetime = (token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0);
        *cached = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: Utc::now() + TokenLifetime::seconds(lifetime),
        });

        Ok(token.access_token)
    }

    /// Drops the cached access token.
    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Builds the URL of a listing, or of the seller's listing collection.
    fn listing_url(&self, sku: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.settings.endpoint)
            .map_err(|e| ListingError::internal(format!("Invalid SP-API endpoint: {e}")))?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ListingError::internal("SP-API endpoint cannot be used as a base URL")
            })?;
            segments.pop_if_empty();
            segments.extend(LISTINGS_API_PATH.split('/'));
            segments.push(&self.settings.seller_id);
            if let Some(sku) = sku {
                segments.push(sku);
            }
        }
        Ok(url)
    }

    /// Executes a request, retrying transient failures.
    ///
    /// Returns `None` when the marketplace answers 404.
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let mut refreshed = false;
        let mut attempt = 0;

        loop {
            match self.execute_once(method.clone(), url, query, body).await {
                Ok(result) => return Ok(result),
                Err(ListingError::Marketplace(MarketplaceError::AuthenticationFailed { .. }))
                    if !refreshed =>
                {
                    debug!("Access token rejected, refreshing");
                    refreshed = true;
                    self.invalidate_token().await;
                }
                Err(e) if e.is_retryable() && attempt + 1 < MAX_RETRIES => {
                    attempt += 1;
                    let linear = self.retry_delay * attempt;
                    let delay = e
                        .retry_delay_secs()
                        .map_or(linear, |secs| linear.max(Duration::from_secs(secs)));
                    debug!("Retry attempt {attempt} of {MAX_RETRIES} in {delay:?}: {e}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Executes a single request.
    async fn execute_once(
        &self,
        method: Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        trace!("{method} {url}");
        let token = self.access_token().await?;

        let mut request = self
            .client
            .request(method, url.clone())
            .header(ACCESS_TOKEN_HEADER, token)
            .header(header::ACCEPT, "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MarketplaceError::network(format!("Request failed: {e}")))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_default();
            return Err(MarketplaceError::RateLimited { retry_after_secs }.into());
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketplaceError::AuthenticationFailed {
                message: format!("{status}: {body}"),
            }
            .into());
        }

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketplaceError::network(format!("{status}: {body}")).into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketplaceError::api_error(status.as_u16(), body).into());
        }

        let value = response.json::<Value>().await.map_err(|e| {
            MarketplaceError::invalid_response(format!("Failed to parse response: {e}"))
        })?;
        Ok(Some(value))
    }

    /// Query parameters shared by every listing call.
    fn marketplace_query(&self) -> Vec<(&'static str, String)> {
        vec![("marketplaceIds", self.settings.marketplace_id.clone())]
    }

    /// Parses a submission response, turning rejections into errors.
    fn submission(sku: &str, value: Option<Value>) -> Result<SubmissionResponse> {
        let value = value.ok_or_else(|| MarketplaceError::ListingNotFound {
            sku: sku.to_string(),
        })?;
        let response: SubmissionResponse = serde_json::from_value(value).map_err(|e| {
            MarketplaceError::invalid_response(format!("Unexpected submission response: {e}"))
        })?;

        if response.is_rejected() {
            return Err(MarketplaceError::SubmissionRejected {
                issues: response.error_messages(),
            }
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl ListingsApi for SpApiClient {
    async fn get_listing(&self, sku: &str) -> Result<Option<Value>> {
        let url = self.listing_url(Some(sku))?;
        let mut query = self.marketplace_query();
        query.push(("includedData", INCLUDED_DATA.to_string()));

        let listing = self.execute(Method::GET, &url, &query, None).await?;
        debug!("Listing {sku} found: {}", listing.is_some());
        Ok(listing)
    }

    async fn put_listing(
        &self,
        sku: &str,
        request: &ListingsItemPutRequest,
    ) -> Result<SubmissionResponse> {
        let url = self.listing_url(Some(sku))?;
        let body = serde_json::to_value(request)
            .map_err(|e| ListingError::internal(format!("Failed to encode listing: {e}")))?;

        let response = self
            .execute(Method::PUT, &url, &self.marketplace_query(), Some(&body))
            .await?;
        let submission = Self::submission(sku, response)?;
        info!("Submitted listing {sku} ({})", submission.submission_id);
        Ok(submission)
    }

    async fn patch_listing(
        &self,
        sku: &str,
        product_type: &str,
        patches: &[PatchOperation],
    ) -> Result<SubmissionResponse> {
        let url = self.listing_url(Some(sku))?;
        let body = json!({
            "productType": product_type,
            "patches": patches,
        });

        let response = self
            .execute(Method::PATCH, &url, &self.marketplace_query(), Some(&body))
            .await?;
        let submission = Self::submission(sku, response)?;
        info!(
            "Patched {} attribute(s) on {sku} ({})",
            patches.len(),
            submission.submission_id
        );
        Ok(submission)
    }

    async fn delete_listing(&self, sku: &str) -> Result<SubmissionResponse> {
        let url = self.listing_url(Some(sku))?;
        let response = self
            .execute(Method::DELETE, &url, &self.marketplace_query(), None)
            .await?;
        let submission = Self::submission(sku, response)?;
        info!("Deleted listing {sku}");
        Ok(submission)
    }

    async fn search_listings(&self, page_size: u32) -> Result<Vec<ListingSummary>> {
        let url = self.listing_url(None)?;
        let mut query = self.marketplace_query();
        query.push(("includedData", String::from("summaries")));
        query.push(("pageSize", page_size.to_string()));

        let response = self
            .execute(Method::GET, &url, &query, None)
            .await?
            .unwrap_or(Value::Null);

        let items = response
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(ListingSummary::from_item).collect())
            .unwrap_or_default();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header as header_is, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING_PATH: &str = "/listings/2021-08-01/items/SELLER1/WH-4PIN-18AWG";

    fn settings(server: &MockServer) -> MarketplaceSettings {
        MarketplaceSettings {
            client_id: String::from("client"),
            client_secret: String::from("secret"),
            refresh_token: String::from("refresh"),
            seller_id: String::from("SELLER1"),
            marketplace_id: String::from("ATVPDKIKX0DER"),
            endpoint: server.uri(),
            lwa_endpoint: format!("{}/auth/o2/token", server.uri()),
            currency: String::from("USD"),
        }
    }

    fn client(server: &MockServer) -> SpApiClient {
        SpApiClient::new(settings(server))
            .unwrap()
            .with_retry_delay(Duration::from_millis(1))
    }

    async fn mount_token(server: &MockServer, token: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/o2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_listing_sends_token_and_marketplace() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .and(header_is("x-amz-access-token", "token-1"))
            .and(query_param("marketplaceIds", "ATVPDKIKX0DER"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "sku": "WH-4PIN-18AWG" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let listing = client.get_listing("WH-4PIN-18AWG").await.unwrap();
        assert_eq!(listing, Some(json!({ "sku": "WH-4PIN-18AWG" })));

        // Cached token is reused.
        client.get_listing("WH-4PIN-18AWG").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_listing_is_none() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let listing = client(&server).get_listing("WH-4PIN-18AWG").await.unwrap();
        assert!(listing.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_token_once() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 2).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let listing = client(&server).get_listing("WH-4PIN-18AWG").await.unwrap();
        assert_eq!(listing, Some(json!({})));
    }

    #[tokio::test]
    async fn test_persistent_unauthorized_fails() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 2).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = client(&server).get_listing("WH-4PIN-18AWG").await;
        assert!(matches!(
            result,
            Err(ListingError::Marketplace(MarketplaceError::AuthenticationFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sku": "x" })))
            .mount(&server)
            .await;

        let listing = client(&server).get_listing("WH-4PIN-18AWG").await.unwrap();
        assert!(listing.is_some());
    }

    #[tokio::test]
    async fn test_rate_limit_honours_retry_after() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sku": "x" })))
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let listing = client(&server).get_listing("WH-4PIN-18AWG").await.unwrap();
        assert!(listing.is_some());
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(429))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let result = client(&server).get_listing("WH-4PIN-18AWG").await;
        assert!(matches!(
            result,
            Err(ListingError::Marketplace(MarketplaceError::RateLimited { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rejected_submission_is_an_error() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("PUT"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sku": "WH-4PIN-18AWG",
                "status": "INVALID",
                "submissionId": "sub-1",
                "issues": [{ "code": "4000001", "message": "bad value", "severity": "ERROR" }]
            })))
            .mount(&server)
            .await;

        let request = ListingsItemPutRequest {
            product_type: String::from("ELECTRONIC_COMPONENT"),
            requirements: String::from("LISTING"),
            attributes: serde_json::Map::new(),
        };
        let result = client(&server).put_listing("WH-4PIN-18AWG", &request).await;
        match result {
            Err(ListingError::Marketplace(MarketplaceError::SubmissionRejected { issues })) => {
                assert_eq!(issues, vec!["4000001: bad value"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_patch_sends_product_type_and_patches() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("PATCH"))
            .and(path(LISTING_PATH))
            .and(body_string_contains("\"productType\":\"AUTO_PART\""))
            .and(body_string_contains("/attributes/item_name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sku": "WH-4PIN-18AWG",
                "status": "ACCEPTED",
                "submissionId": "sub-2",
                "issues": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let patches = vec![PatchOperation {
            op: crate::listing::PatchOp::Replace,
            path: String::from("/attributes/item_name"),
            value: json!([{ "value": "New", "marketplace_id": "ATVPDKIKX0DER" }]),
        }];
        let response = client(&server)
            .patch_listing("WH-4PIN-18AWG", "AUTO_PART", &patches)
            .await
            .unwrap();
        assert_eq!(response.submission_id, "sub-2");
    }

    #[tokio::test]
    async fn test_delete_missing_listing() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("DELETE"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client(&server).delete_listing("WH-4PIN-18AWG").await;
        assert!(matches!(
            result,
            Err(ListingError::Marketplace(MarketplaceError::ListingNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_search_listings() {
        let server = MockServer::start().await;
        mount_token(&server, "token-1", 1).await;
        Mock::given(method("GET"))
            .and(path("/listings/2021-08-01/items/SELLER1"))
            .and(query_param("pageSize", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "numberOfResults": 2,
                "items": [
                    { "sku": "A-1", "summaries": [{ "itemName": "First" }] },
                    { "sku": "B-2", "summaries": [] }
                ]
            })))
            .mount(&server)
            .await;

        let listings = client(&server).search_listings(10).await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title.as_deref(), Some("First"));
        assert_eq!(listings[1].sku, "B-2");
    }

    #[tokio::test]
    async fn test_token_exchange_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/o2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let result = client(&server).get_listing("WH-4PIN-18AWG").await;
        assert!(matches!(
            result,
            Err(ListingError::Marketplace(MarketplaceError::AuthenticationFailed { .. }))
        ));
    }
}
