use crate::utils::validation::sanitize_filename;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Directory (relative to the media root) that uploaded images land in.
pub const IMAGE_UPLOAD_DIR: &str = "images";

/// Backend holding uploaded image content. The catalog only keeps the
/// reference string returned by [`StorageService::store`].
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Persists `data` and returns a reference relative to the media root.
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String>;
    async fn delete(&self, reference: &str) -> Result<()>;
    async fn exists(&self, reference: &str) -> Result<bool>;
}

pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a reference inside the media root, refusing anything that
    /// would escape it.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let relative = Path::new(reference);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(anyhow!("Invalid storage reference: {}", reference));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let name = sanitize_filename(original_name)?;
        let reference = format!("{}/{}-{}", IMAGE_UPLOAD_DIR, Uuid::new_v4(), name);
        let path = self.resolve(&reference)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        tracing::info!("💾 Stored {} ({} bytes)", reference, data.len());
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }

    async fn exists(&self, reference: &str) -> Result<bool> {
        let path = self.resolve(reference)?;
        Ok(fs::try_exists(&path).await?)
    }
}
