pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::GalleryConfig;
use crate::services::catalog::CatalogStore;
use crate::services::gallery::{GalleryService, HtmlGalleryRenderer};
use crate::services::storage::StorageService;
use axum::{
    Router,
    routing::{delete, get, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::gallery::gallery_page,
        api::handlers::gallery::list_gallery_images,
        api::handlers::health::health_check,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::get_category,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
        api::handlers::images::list_images,
        api::handlers::images::create_image,
        api::handlers::images::get_image,
        api::handlers::images::update_image,
        api::handlers::images::replace_image_file,
        api::handlers::images::delete_image,
        api::handlers::images::list_image_categories,
        api::handlers::images::add_image_categories,
        api::handlers::images::set_image_categories,
        api::handlers::images::clear_image_categories,
        api::handlers::images::remove_image_category,
    ),
    components(
        schemas(
            models::Category,
            models::Image,
            models::NewCategory,
            models::CategoryUpdate,
            models::ImageUpdate,
            api::handlers::images::ImageUploadForm,
            api::handlers::images::ImageFileForm,
            api::handlers::images::CategoryIdsRequest,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "gallery", description = "Public gallery listing"),
        (name = "categories", description = "Category administration"),
        (name = "images", description = "Image administration"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogStore,
    pub gallery: GalleryService,
    pub storage: Arc<dyn StorageService>,
    pub config: GalleryConfig,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageService>,
        config: GalleryConfig,
    ) -> Self {
        let catalog = CatalogStore::new(db);
        let renderer = Arc::new(HtmlGalleryRenderer::new(
            config.site_title.clone(),
            config.media_url.clone(),
        ));
        let gallery = GalleryService::new(catalog.clone(), renderer);

        Self {
            catalog,
            gallery,
            storage,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/categories",
            get(api::handlers::categories::list_categories)
                .post(api::handlers::categories::create_category),
        )
        .route(
            "/categories/:id",
            get(api::handlers::categories::get_category)
                .put(api::handlers::categories::update_category)
                .delete(api::handlers::categories::delete_category),
        )
        .route(
            "/images",
            get(api::handlers::images::list_images).post(api::handlers::images::create_image),
        )
        .route(
            "/images/:id",
            get(api::handlers::images::get_image)
                .put(api::handlers::images::update_image)
                .delete(api::handlers::images::delete_image),
        )
        .route(
            "/images/:id/file",
            put(api::handlers::images::replace_image_file),
        )
        .route(
            "/images/:id/categories",
            get(api::handlers::images::list_image_categories)
                .post(api::handlers::images::add_image_categories)
                .put(api::handlers::images::set_image_categories)
                .delete(api::handlers::images::clear_image_categories),
        )
        .route(
            "/images/:id/categories/:category_id",
            delete(api::handlers::images::remove_image_category),
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::gallery::gallery_page))
        .route("/api/images", get(api::handlers::gallery::list_gallery_images))
        .route("/health", get(api::handlers::health::health_check))
        .nest("/admin", admin)
        .nest_service(&state.config.media_url, ServeDir::new(&state.config.media_root))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size + 1024 * 1024, // 1MB buffer for multipart overhead
        ))
        .with_state(state)
}
