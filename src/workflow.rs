//! Listing workflow.
//!
//! This module ties validation output, image hosting, payload building and
//! the marketplace client together. Updates are diff-gated: the published
//! listing is fetched, compared with the configuration, and only the touched
//! attributes are patched.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::ProductConfig;
use crate::error::{MarketplaceError, MediaError, Result};
use crate::listing::{
    ChangeDetector, FieldChange, ListingPayloadBuilder, ListingsItemPutRequest, PatchOperation,
    attributes::MAX_IMAGE_LOCATORS,
};
use crate::marketplace::{ListingSummary, ListingsApi, SubmissionResponse};
use crate::media::{ImageUploader, resolve_images};

/// Result of a create run.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    /// Seller SKU.
    pub sku: String,
    /// Image URLs placed in the request.
    pub image_urls: Vec<String>,
    /// Request that was (or would have been) submitted.
    pub request: ListingsItemPutRequest,
    /// Marketplace response, `None` on a dry run.
    pub submission: Option<SubmissionResponse>,
}

/// Result of an update run.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    /// Seller SKU.
    pub sku: String,
    /// Detected changes.
    pub changes: Vec<FieldChange>,
    /// Patch operations that were (or would have been) submitted.
    pub patches: Vec<PatchOperation>,
    /// Marketplace response, `None` when nothing was submitted.
    pub submission: Option<SubmissionResponse>,
}

impl UpdateOutcome {
    /// Returns true if the listing already matched the configuration.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns true if patches were submitted.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.submission.is_some()
    }
}

/// Drives listing operations against the marketplace.
pub struct ListingWorkflow<'a, A: ListingsApi, U: ImageUploader> {
    /// Marketplace client.
    api: &'a A,
    /// Image uploader, absent when no bucket is configured.
    uploader: Option<&'a U>,
    /// Payload builder.
    builder: ListingPayloadBuilder,
    /// Change detector.
    detector: ChangeDetector,
    /// Stop before any marketplace or bucket write.
    dry_run: bool,
}

impl<'a, A: ListingsApi, U: ImageUploader> ListingWorkflow<'a, A, U> {
    /// Creates a new workflow.
    #[must_use]
    pub const fn new(
        api: &'a A,
        uploader: Option<&'a U>,
        builder: ListingPayloadBuilder,
    ) -> Self {
        Self {
            api,
            uploader,
            builder,
            detector: ChangeDetector::new(),
            dry_run: false,
        }
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Uploads the configured images, or maps them to `file://` URLs on a
    /// dry run.
    async fn image_urls(&self, config: &ProductConfig, base_dir: &Path) -> Result<Vec<String>> {
        let paths = resolve_images(base_dir, submitted_images(config));

        if self.dry_run {
            return Ok(paths
                .iter()
                .map(|p| format!("file://{}", p.display()))
                .collect());
        }

        let uploader = self.uploader.ok_or(MediaError::NotConfigured)?;
        let mut urls = Vec::with_capacity(paths.len());
        for path in &paths {
            urls.push(uploader.upload(config.sku(), path).await?);
        }
        Ok(urls)
    }

    /// Creates (or fully replaces) the listing for a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an image upload, the payload guard or the
    /// submission fails.
    pub async fn create(&self, config: &ProductConfig, base_dir: &Path) -> Result<CreateOutcome> {
        let sku = config.sku().to_string();
        info!("Creating listing {sku}");

        let image_urls = self.image_urls(config, base_dir).await?;
        let request = self.builder.build(config, &image_urls)?;

        let submission = if self.dry_run {
            info!("Dry run, not submitting {sku}");
            None
        } else {
            Some(self.api.put_listing(&sku, &request).await?)
        };

        Ok(CreateOutcome {
            sku,
            image_urls,
            request,
            submission,
        })
    }

    /// Compares the published listing with a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing does not exist or cannot be fetched.
    pub async fn preview_changes(&self, config: &ProductConfig) -> Result<Vec<FieldChange>> {
        let remote = self.fetch(config.sku()).await?;
        Ok(self.detector.detect_changes(&remote, config))
    }

    /// Fetches, compares and patches a listing in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched or patched.
    pub async fn update(&self, config: &ProductConfig, base_dir: &Path) -> Result<UpdateOutcome> {
        let changes = self.preview_changes(config).await?;
        self.apply_changes(config, base_dir, changes).await
    }

    /// Patches the attributes touched by previously detected changes.
    ///
    /// An empty change set submits nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if an image upload, the payload guard or the patch
    /// fails.
    pub async fn apply_changes(
        &self,
        config: &ProductConfig,
        base_dir: &Path,
        changes: Vec<FieldChange>,
    ) -> Result<UpdateOutcome> {
        let sku = config.sku().to_string();

        if changes.is_empty() {
            info!("Listing {sku} is up to date");
            return Ok(UpdateOutcome {
                sku,
                changes,
                patches: Vec::new(),
                submission: None,
            });
        }

        let images_changed = changes.iter().any(|c| c.field == "image_count");
        let image_urls = if images_changed {
            self.image_urls(config, base_dir).await?
        } else {
            resolve_images(base_dir, submitted_images(config))
                .iter()
                .map(|p| format!("file://{}", p.display()))
                .collect()
        };

        let request = self.builder.build(config, &image_urls)?;
        let patches = self.builder.patches_for(&request, &changes);
        debug!("{} change(s) map to {} patch(es)", changes.len(), patches.len());

        let submission = if self.dry_run {
            info!("Dry run, not patching {sku}");
            None
        } else {
            Some(
                self.api
                    .patch_listing(&sku, &request.product_type, &patches)
                    .await?,
            )
        };

        Ok(UpdateOutcome {
            sku,
            changes,
            patches,
            submission,
        })
    }

    /// Fetches a published listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing does not exist or cannot be fetched.
    pub async fn fetch(&self, sku: &str) -> Result<Value> {
        self.api.get_listing(sku).await?.ok_or_else(|| {
            MarketplaceError::ListingNotFound {
                sku: sku.to_string(),
            }
            .into()
        })
    }

    /// Deletes a listing. Returns `None` on a dry run.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    pub async fn delete(&self, sku: &str) -> Result<Option<SubmissionResponse>> {
        if self.dry_run {
            info!("Dry run, not deleting {sku}");
            return Ok(None);
        }
        self.api.delete_listing(sku).await.map(Some)
    }

    /// Lists the seller's listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn list(&self, page_size: u32) -> Result<Vec<ListingSummary>> {
        self.api.search_listings(page_size).await
    }
}

/// Images that fit in the listing's locator slots. Extra images are logged
/// and left out.
fn submitted_images(config: &ProductConfig) -> &[String] {
    if config.images.len() > MAX_IMAGE_LOCATORS {
        warn!(
            "Listing holds {MAX_IMAGE_LOCATORS} images; skipping {} extra image(s)",
            config.images.len() - MAX_IMAGE_LOCATORS
        );
    }
    &config.images[..config.images.len().min(MAX_IMAGE_LOCATORS)]
}
