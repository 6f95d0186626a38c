use std::env;
use std::path::PathBuf;

/// Runtime configuration for the gallery backend
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Database connection string (default: "sqlite://gallery.db?mode=rwc")
    pub database_url: String,

    /// Directory uploaded images are written under (default: "media")
    pub media_root: PathBuf,

    /// URL prefix the media root is served at (default: "/media")
    pub media_url: String,

    /// Maximum upload size in bytes (default: 10 MB)
    pub max_upload_size: usize,

    /// Heading of the public gallery page (default: "Gallery")
    pub site_title: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gallery.db?mode=rwc".to_string(),
            media_root: PathBuf::from("media"),
            media_url: "/media".to_string(),
            max_upload_size: 10 * 1024 * 1024, // 10 MB
            site_title: "Gallery".to_string(),
        }
    }
}

impl GalleryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.media_root),

            media_url: env::var("MEDIA_URL")
                .map(|v| normalize_media_url(&v))
                .unwrap_or(default.media_url),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            site_title: env::var("GALLERY_TITLE").unwrap_or(default.site_title),
        }
    }

    /// Config for tests and local runs: in-memory database, media under `media_root`
    pub fn development(media_root: impl Into<PathBuf>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            media_root: media_root.into(),
            ..Self::default()
        }
    }
}

/// "media/" and "/media/" both become "/media".
fn normalize_media_url(value: &str) -> String {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/media".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
