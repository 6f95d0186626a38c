use crate::api::error::AppError;
use crate::models::{Category, CategoryUpdate, NewCategory};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/admin/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.catalog.list_categories().await?))
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid name")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    Json(req): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state.catalog.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/admin/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.catalog.get_category(id).await?))
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    request_body = CategoryUpdate,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid name"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(req): Json<CategoryUpdate>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.catalog.update_category(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted, images kept"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
