//! Image hosting module.
//!
//! The marketplace only accepts images by URL, so local files are uploaded
//! first through an [`ImageUploader`].

mod uploader;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use uploader::{S3ImageUploader, content_type, object_key, public_url};

/// Uploads a local image and returns its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads one image for a SKU.
    async fn upload(&self, sku: &str, path: &Path) -> Result<String>;
}

/// Resolves one configured image path against the configuration directory.
#[must_use]
pub fn resolve_image(base_dir: &Path, image: &str) -> PathBuf {
    let path = Path::new(image);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Resolves configured image paths against the configuration directory.
#[must_use]
pub fn resolve_images(base_dir: &Path, images: &[String]) -> Vec<PathBuf> {
    images
        .iter()
        .map(|image| resolve_image(base_dir, image))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_images() {
        let resolved = resolve_images(
            Path::new("/configs/harness"),
            &[String::from("img/a.jpg"), String::from("/abs/b.png")],
        );
        assert_eq!(resolved[0], PathBuf::from("/configs/harness/img/a.jpg"));
        assert_eq!(resolved[1], PathBuf::from("/abs/b.png"));
    }
}
