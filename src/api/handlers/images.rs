use crate::api::error::AppError;
use crate::models::{Category, Image, ImageUpdate, NewImage};
use crate::services::storage::IMAGE_UPLOAD_DIR;
use crate::utils::validation::{ValidationError, sanitize_filename};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Multipart body accepted by `POST /admin/images`.
#[derive(ToSchema)]
pub struct ImageUploadForm {
    pub title: String,
    pub age_limit: i64,
    /// Category ids; repeat the field or send a comma separated list.
    pub categories: Option<Vec<i32>>,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart body accepted by `PUT /admin/images/{id}/file`.
#[derive(ToSchema)]
pub struct ImageFileForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Deserialize, ToSchema)]
pub struct CategoryIdsRequest {
    pub category_ids: Vec<i32>,
}

#[utoipa::path(
    get,
    path = "/admin/images",
    responses(
        (status = 200, description = "All images with categories", body = Vec<Image>)
    ),
    tag = "images"
)]
pub async fn list_images(State(state): State<crate::AppState>) -> Result<Json<Vec<Image>>, AppError> {
    Ok(Json(state.catalog.list_images().await?))
}

#[utoipa::path(
    post,
    path = "/admin/images",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data", description = "Image upload"),
    responses(
        (status = 201, description = "Image created", body = Image),
        (status = 400, description = "Invalid field or missing file"),
        (status = 404, description = "Unknown category"),
        (status = 413, description = "Upload too large")
    ),
    tag = "images"
)]
pub async fn create_image(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Image>), AppError> {
    let mut title: Option<String> = None;
    let mut age_limit: Option<i64> = None;
    let mut categories: Vec<i32> = Vec::new();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "age_limit" => {
                let text = field.text().await.map_err(multipart_error)?;
                age_limit = Some(text.trim().parse().map_err(|_| {
                    ValidationError::new(
                        "age_limit",
                        "invalid",
                        "Age limit must be a non-negative integer",
                    )
                })?);
            }
            "categories" => {
                let text = field.text().await.map_err(multipart_error)?;
                categories.extend(parse_category_ids(&text)?);
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                upload = Some((file_name, data.to_vec()));
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let title = title.ok_or_else(|| required("title"))?;
    let age_limit = age_limit.ok_or_else(|| required("age_limit"))?;
    let (file_name, data) = upload.ok_or_else(|| required("image"))?;
    let file_name = sanitize_filename(&file_name)?;

    // Check every field before the file is written.
    let mut input = NewImage {
        title,
        image: format!("{}/{}", IMAGE_UPLOAD_DIR, file_name),
        age_limit,
        categories,
    };
    input.validate().map_err(ValidationError::from)?;

    let reference = state.storage.store(&file_name, &data).await?;
    input.image = reference.clone();

    match state.catalog.create_image(input).await {
        Ok(image) => Ok((StatusCode::CREATED, Json(image))),
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&reference).await {
                tracing::warn!("Failed to remove orphaned upload {}: {}", reference, cleanup);
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/images/{id}",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image with categories", body = Image),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn get_image(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Image>, AppError> {
    Ok(Json(state.catalog.get_image(id).await?))
}

#[utoipa::path(
    put,
    path = "/admin/images/{id}",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    request_body = ImageUpdate,
    responses(
        (status = 200, description = "Image updated", body = Image),
        (status = 400, description = "Invalid field"),
        (status = 422, description = "Unknown field, e.g. `image`"),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn update_image(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(req): Json<ImageUpdate>,
) -> Result<Json<Image>, AppError> {
    Ok(Json(state.catalog.update_image(id, req).await?))
}

#[utoipa::path(
    put,
    path = "/admin/images/{id}/file",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    request_body(content = ImageFileForm, content_type = "multipart/form-data", description = "Replacement file"),
    responses(
        (status = 200, description = "File replaced", body = Image),
        (status = 400, description = "Missing or invalid file"),
        (status = 404, description = "Image not found"),
        (status = 413, description = "Upload too large")
    ),
    tag = "images"
)]
pub async fn replace_image_file(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<Image>, AppError> {
    // Unknown ids fail before anything is written.
    state.catalog.get_image(id).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("image") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            upload = Some((file_name, data.to_vec()));
        } else {
            tracing::debug!("Ignoring multipart field '{:?}'", field.name());
        }
    }

    let (file_name, data) = upload.ok_or_else(|| required("image"))?;
    let file_name = sanitize_filename(&file_name)?;
    let reference = state.storage.store(&file_name, &data).await?;

    match state.catalog.replace_image_file(id, reference.clone()).await {
        Ok((image, previous)) => {
            if let Err(e) = state.storage.delete(&previous).await {
                tracing::warn!("Failed to remove replaced file {}: {}", previous, e);
            }
            Ok(Json(image))
        }
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&reference).await {
                tracing::warn!("Failed to remove orphaned upload {}: {}", reference, cleanup);
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/admin/images/{id}",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted, categories kept"),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/images/{id}/categories",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Categories of the image", body = Vec<Category>),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn list_image_categories(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.catalog.image_categories(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/images/{id}/categories",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    request_body = CategoryIdsRequest,
    responses(
        (status = 200, description = "Resulting category set", body = Vec<Category>),
        (status = 404, description = "Image or category not found")
    ),
    tag = "images"
)]
pub async fn add_image_categories(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(req): Json<CategoryIdsRequest>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.catalog.add_categories(id, &req.category_ids).await?))
}

#[utoipa::path(
    put,
    path = "/admin/images/{id}/categories",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    request_body = CategoryIdsRequest,
    responses(
        (status = 200, description = "Category set replaced", body = Vec<Category>),
        (status = 404, description = "Image or category not found")
    ),
    tag = "images"
)]
pub async fn set_image_categories(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(req): Json<CategoryIdsRequest>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.catalog.set_categories(id, &req.category_ids).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/images/{id}/categories",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "All categories detached"),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn clear_image_categories(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.catalog.clear_categories(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/admin/images/{id}/categories/{category_id}",
    params(
        ("id" = i32, Path, description = "Image ID"),
        ("category_id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category detached (no-op when not attached)"),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn remove_image_category(
    State(state): State<crate::AppState>,
    Path((id, category_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    state.catalog.remove_category(id, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

fn required(field: &str) -> AppError {
    AppError::Validation(ValidationError::new(
        field,
        "required",
        format!("Field '{}' is required", field),
    ))
}

fn parse_category_ids(text: &str) -> Result<Vec<i32>, ValidationError> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| {
                ValidationError::new(
                    "categories",
                    "invalid",
                    format!("'{}' is not a category id", s),
                )
            })
        })
        .collect()
}
