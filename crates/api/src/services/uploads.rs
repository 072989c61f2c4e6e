//! Image uploads stored on local disk.
//!
//! Files land in `{upload_dir}/{kind}/{unix_millis}-{9 digits}.{ext}` and are
//! served back under `/uploads/{kind}/...`. Validation happens before any
//! byte is written, so a rejected upload leaves nothing behind.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use thiserror::Error;
use tracing::instrument;

use crate::config::UploadConfig;

static IMAGE_EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(jpe?g|png|gif|webp|svg)$").expect("Invalid regex"));

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Errors from validating or storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unknown upload kind: {0}")]
    UnknownKind(String),

    #[error("no file was uploaded")]
    MissingFile,

    #[error("only image files are allowed (jpg, jpeg, png, gif, webp, svg)")]
    InvalidExtension,

    #[error("file is larger than {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Which entity an image belongs to; also its subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Products,
    Categories,
    Subcategories,
    Companies,
    Colors,
    Settings,
}

impl UploadKind {
    pub const ALL: [Self; 6] = [
        Self::Products,
        Self::Categories,
        Self::Subcategories,
        Self::Companies,
        Self::Colors,
        Self::Settings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Subcategories => "subcategories",
            Self::Companies => "companies",
            Self::Colors => "colors",
            Self::Settings => "settings",
        }
    }
}

impl FromStr for UploadKind {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UploadError::UnknownKind(s.to_owned()))
    }
}

/// A file that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Public URL, e.g. `/uploads/products/1760000000000-123456789.png`.
    pub url: String,
    pub path: PathBuf,
}

/// Writes validated images under the configured directory.
pub struct UploadStore<'a> {
    config: &'a UploadConfig,
}

impl<'a> UploadStore<'a> {
    #[must_use]
    pub const fn new(config: &'a UploadConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.config.max_bytes
    }

    /// Validate and persist one image.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidExtension` or `UploadError::TooLarge`
    /// without touching the disk, or `UploadError::Io` if writing fails.
    #[instrument(skip(self, bytes), fields(kind = kind.as_str(), size = bytes.len()))]
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        let ext = image_extension(original_name)?;
        if bytes.len() > self.config.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.config.max_bytes,
            });
        }

        let dir = self.config.dir.join(kind.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = generate_file_name(&ext);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(path = %path.display(), "Stored upload");
        Ok(StoredUpload {
            url: format!("{PUBLIC_PREFIX}/{}/{file_name}", kind.as_str()),
            path,
        })
    }
}

/// The lowercased extension of `file_name` if it is an allowed image type.
fn image_extension(file_name: &str) -> Result<String, UploadError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| IMAGE_EXTENSION_RE.is_match(ext))
        .ok_or(UploadError::InvalidExtension)?;
    Ok(ext.to_ascii_lowercase())
}

fn generate_file_name(ext: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{millis}-{suffix:09}.{ext}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path, max_bytes: usize) -> UploadConfig {
        UploadConfig {
            dir: dir.to_path_buf(),
            max_bytes,
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("colors".parse::<UploadKind>().unwrap(), UploadKind::Colors);
        assert!(matches!(
            "avatars".parse::<UploadKind>(),
            Err(UploadError::UnknownKind(k)) if k == "avatars"
        ));
        assert!("Products".parse::<UploadKind>().is_err());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
        assert_eq!(image_extension("logo.svg").unwrap(), "svg");
        assert!(image_extension("script.exe").is_err());
        assert!(image_extension("noextension").is_err());
        assert!(image_extension("shell.php.png.sh").is_err());
    }

    #[test]
    fn test_generated_name_shape() {
        let name = generate_file_name("png");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        let (millis, digits) = stem.split_once('-').unwrap();
        assert_eq!(ext, "png");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(digits.len(), 9);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_save_writes_under_kind_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 1024);
        let stored = UploadStore::new(&config)
            .save(UploadKind::Products, "shirt.PNG", b"\x89PNG")
            .await
            .unwrap();

        assert!(stored.url.starts_with("/uploads/products/"));
        assert!(stored.url.ends_with(".png"));
        assert!(stored.path.starts_with(dir.path().join("products")));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_rejections_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 4);
        let store = UploadStore::new(&config);

        assert!(matches!(
            store.save(UploadKind::Companies, "logo.bmp", b"abc").await,
            Err(UploadError::InvalidExtension)
        ));
        assert!(matches!(
            store.save(UploadKind::Companies, "logo.png", b"too big").await,
            Err(UploadError::TooLarge { max_bytes: 4 })
        ));
        assert!(!dir.path().join("companies").exists());
    }
}
