use crate::config::GalleryConfig;
use crate::services::storage::{IMAGE_UPLOAD_DIR, LocalStorageService};
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &GalleryConfig) -> anyhow::Result<Arc<LocalStorageService>> {
    let upload_dir = config.media_root.join(IMAGE_UPLOAD_DIR);

    tokio::fs::create_dir_all(&upload_dir).await?;
    info!(
        "🗂️  Media storage: {} (served at {})",
        config.media_root.display(),
        config.media_url
    );

    Ok(Arc::new(LocalStorageService::new(config.media_root.clone())))
}
