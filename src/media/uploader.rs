//! S3-hosted listing images.
//!
//! Images are stored under a content-addressed key so re-uploading an
//! unchanged file is a no-op overwrite with an identical URL.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaSettings;
use crate::error::{MediaError, Result};

use super::ImageUploader;

/// Hex characters of the content digest kept in the object key.
const DIGEST_PREFIX_LEN: usize = 16;

/// Content type for a listing image, by extension.
///
/// # Errors
///
/// Returns an error if the extension is not `.jpg`, `.jpeg` or `.png`.
pub fn content_type(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        _ => Err(MediaError::UnsupportedFormat {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

/// Object key for an image: `<prefix>/<sku>/<digest>.<ext>`.
#[must_use]
pub fn object_key(prefix: &str, sku: &str, content: &[u8], extension: &str) -> String {
    let digest = hex::encode(Sha256::digest(content));
    let name = format!(
        "{}.{}",
        &digest[..DIGEST_PREFIX_LEN],
        extension.to_ascii_lowercase()
    );

    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{sku}/{name}")
    } else {
        format!("{prefix}/{sku}/{name}")
    }
}

/// Public HTTPS URL of an object.
#[must_use]
pub fn public_url(bucket: &str, region: Option<&str>, key: &str) -> String {
    match region {
        Some(region) => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
        None => format!("https://{bucket}.s3.amazonaws.com/{key}"),
    }
}

/// Uploads images to an S3 bucket.
#[derive(Debug)]
pub struct S3ImageUploader {
    /// S3 client.
    client: Client,
    /// Bucket name.
    bucket: String,
    /// Key prefix.
    prefix: String,
    /// Bucket region, used in public URLs.
    region: Option<String>,
}

impl S3ImageUploader {
    /// Creates an uploader from media settings.
    ///
    /// # Errors
    ///
    /// Returns an error if no bucket is configured.
    pub async fn new(settings: &MediaSettings) -> Result<Self> {
        let bucket = settings
            .bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or(MediaError::NotConfigured)?;

        let config = if let Some(region) = &settings.region {
            aws_config::from_env()
                .region(aws_config::Region::new(region.clone()))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        let region = settings
            .region
            .clone()
            .or_else(|| config.region().map(ToString::to_string));

        Ok(Self::with_client(
            Client::new(&config),
            bucket,
            settings.prefix.as_deref(),
            region,
        ))
    }

    /// Creates an uploader with an existing client.
    #[must_use]
    pub fn with_client(
        client: Client,
        bucket: &str,
        prefix: Option<&str>,
        region: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.unwrap_or("listing-images").to_string(),
            region,
        }
    }
}

#[async_trait]
impl ImageUploader for S3ImageUploader {
    async fn upload(&self, sku: &str, path: &Path) -> Result<String> {
        let content_type = content_type(path)?;
        let content = tokio::fs::read(path).await?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let key = object_key(&self.prefix, sku, &content, extension);

        debug!("Uploading {} to s3://{}/{key}", path.display(), self.bucket);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| MediaError::UploadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let url = public_url(&self.bucket, self.region.as_deref(), &key);
        info!("Uploaded {} as {url}", path.display());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListingError;
    use std::path::PathBuf;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("a.JPG")).unwrap(), "image/jpeg");
        assert_eq!(content_type(Path::new("a.jpeg")).unwrap(), "image/jpeg");
        assert_eq!(content_type(Path::new("dir/a.Png")).unwrap(), "image/png");
        assert!(matches!(
            content_type(Path::new("a.gif")),
            Err(ListingError::Media(MediaError::UnsupportedFormat { .. }))
        ));
        assert!(content_type(&PathBuf::from("noext")).is_err());
    }

    #[test]
    fn test_object_key_is_content_addressed() {
        let a = object_key("listing-images/", "WH-4", b"one", "JPG");
        let b = object_key("listing-images", "WH-4", b"one", "jpg");
        let c = object_key("listing-images", "WH-4", b"two", "jpg");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("listing-images/WH-4/"));
        assert!(a.ends_with(".jpg"));
        // prefix/sku/ + 16 hex + .jpg
        assert_eq!(a.len(), "listing-images/WH-4/".len() + DIGEST_PREFIX_LEN + 4);
    }

    #[test]
    fn test_object_key_without_prefix() {
        let key = object_key("", "WH-4", b"one", "png");
        assert!(key.starts_with("WH-4/"));
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("bucket", Some("us-east-1"), "a/b.jpg"),
            "https://bucket.s3.us-east-1.amazonaws.com/a/b.jpg"
        );
        assert_eq!(
            public_url("bucket", None, "a/b.jpg"),
            "https://bucket.s3.amazonaws.com/a/b.jpg"
        );
    }

    #[tokio::test]
    async fn test_new_requires_bucket() {
        let result = S3ImageUploader::new(&MediaSettings::default()).await;
        assert!(matches!(
            result,
            Err(ListingError::Media(MediaError::NotConfigured))
        ));
    }
}
