//! Selling Partner API integration module.
//!
//! This module provides the Listings Items client and the [`ListingsApi`]
//! seam the workflow talks to.

mod client;
mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::listing::{ListingsItemPutRequest, PatchOperation};

pub use client::SpApiClient;
pub use types::{ListingIssue, ListingSummary, SubmissionResponse};

/// Operations on a seller's listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingsApi: Send + Sync {
    /// Reads a listing. Returns `None` if the SKU has no listing.
    async fn get_listing(&self, sku: &str) -> Result<Option<Value>>;

    /// Creates or fully replaces a listing.
    async fn put_listing(
        &self,
        sku: &str,
        request: &ListingsItemPutRequest,
    ) -> Result<SubmissionResponse>;

    /// Applies patch operations to a listing.
    async fn patch_listing(
        &self,
        sku: &str,
        product_type: &str,
        patches: &[PatchOperation],
    ) -> Result<SubmissionResponse>;

    /// Deletes a listing.
    async fn delete_listing(&self, sku: &str) -> Result<SubmissionResponse>;

    /// Lists the seller's listings, one page.
    async fn search_listings(&self, page_size: u32) -> Result<Vec<ListingSummary>>;
}
