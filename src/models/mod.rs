use chrono::NaiveDate;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{categories, images};

/// Longest `name`/`title` the catalog accepts, in characters.
pub const MAX_TEXT_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// An image record together with its resolved category set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Image {
    pub id: i32,
    pub title: String,
    /// Reference into the file-storage backend.
    pub image: String,
    pub created_date: NaiveDate,
    pub age_limit: u32,
    pub categories: Vec<Category>,
}

impl Image {
    /// Fails with `DbErr::Type` if the stored age limit is negative.
    pub(crate) fn from_parts(
        model: images::Model,
        categories: Vec<categories::Model>,
    ) -> Result<Self, DbErr> {
        let age_limit = u32::try_from(model.age_limit).map_err(|_| {
            DbErr::Type(format!(
                "image {} has invalid age_limit {}",
                model.id, model.age_limit
            ))
        })?;

        Ok(Self {
            id: model.id,
            title: model.title,
            image: model.image,
            created_date: model.created_date,
            age_limit,
            categories: categories.into_iter().map(Category::from).collect(),
        })
    }

    pub fn has_category(&self, category_id: i32) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct NewCategory {
    #[validate(length(max = 255, message = "Category name must be at most 255 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CategoryUpdate {
    #[validate(length(max = 255, message = "Category name must be at most 255 characters"))]
    pub name: Option<String>,
}

/// Input for a new image. There is no `created_date`: the store stamps it.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct NewImage {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Image reference must be 1 to 255 characters"))]
    pub image: String,
    #[validate(range(min = 0, max = 2147483647, message = "Age limit must be a non-negative integer"))]
    pub age_limit: i64,
    #[serde(default)]
    pub categories: Vec<i32>,
}

/// Metadata changes for an image. The file itself is replaced through
/// storage, never by setting a reference here.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct ImageUpdate {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0, max = 2147483647, message = "Age limit must be a non-negative integer"))]
    pub age_limit: Option<i64>,
}
