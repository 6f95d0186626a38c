use crate::api::error::AppError;
use crate::models::Image;
use axum::{Json, extract::State, response::Html};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Rendered gallery page", content_type = "text/html")
    ),
    tag = "gallery"
)]
pub async fn gallery_page(State(state): State<crate::AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.gallery.render_page().await?))
}

#[utoipa::path(
    get,
    path = "/api/images",
    responses(
        (status = 200, description = "Every image with its categories", body = Vec<Image>)
    ),
    tag = "gallery"
)]
pub async fn list_gallery_images(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Image>>, AppError> {
    Ok(Json(state.gallery.list_for_display().await?))
}
