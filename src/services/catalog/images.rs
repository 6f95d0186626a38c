use crate::entities::{prelude::*, *};
use crate::models::{Image, ImageUpdate, MAX_TEXT_LENGTH, NewImage};
use crate::utils::validation::ValidationError;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use validator::Validate;

use super::associations::{link_categories, related_categories};
use super::categories::load_categories;
use super::{CatalogError, CatalogStore};

impl CatalogStore {
    /// Inserts a new image. `created_date` is always today's UTC date; any
    /// initial categories must already exist.
    pub async fn create_image(&self, input: NewImage) -> Result<Image, CatalogError> {
        input.validate()?;
        let age_limit = age_limit_column(input.age_limit)?;

        let txn = self.db.begin().await?;

        let categories = load_categories(&txn, &input.categories).await?;
        let model = images::ActiveModel {
            title: Set(input.title),
            image: Set(input.image),
            created_date: Set(Utc::now().date_naive()),
            age_limit: Set(age_limit),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let category_ids: Vec<i32> = categories.iter().map(|c| c.id).collect();
        link_categories(&txn, model.id, &category_ids).await?;

        txn.commit().await?;

        tracing::info!(
            "🖼️  Created image {} '{}' with {} categories",
            model.id,
            model.title,
            categories.len()
        );
        Ok(Image::from_parts(model, categories)?)
    }

    pub async fn get_image(&self, id: i32) -> Result<Image, CatalogError> {
        let model = find_image(&self.db, id).await?;
        let categories = related_categories(&self.db, &model).await?;
        Ok(Image::from_parts(model, categories)?)
    }

    /// Every image with its categories resolved, ordered by id.
    pub async fn list_images(&self) -> Result<Vec<Image>, CatalogError> {
        let rows = Images::find()
            .order_by_asc(images::Column::Id)
            .find_with_related(Categories)
            .all(&self.db)
            .await?;

        let images = rows
            .into_iter()
            .map(|(model, mut categories)| {
                categories.sort_by_key(|c| c.id);
                Image::from_parts(model, categories)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(images)
    }

    /// Applies the supplied fields only. `created_date` is never changed.
    pub async fn update_image(&self, id: i32, update: ImageUpdate) -> Result<Image, CatalogError> {
        update.validate()?;
        let age_limit = update.age_limit.map(age_limit_column).transpose()?;

        let model = find_image(&self.db, id).await?;
        let mut active_model = model.clone().into_active_model();

        if let Some(title) = update.title {
            active_model.title = Set(title);
        }
        if let Some(age_limit) = age_limit {
            active_model.age_limit = Set(age_limit);
        }

        let model = if active_model.is_changed() {
            let res = active_model.update(&self.db).await?;
            tracing::info!("🖼️  Updated image {}", res.id);
            res
        } else {
            model
        };

        let categories = related_categories(&self.db, &model).await?;
        Ok(Image::from_parts(model, categories)?)
    }

    /// Points the image at a newly stored file. Returns the updated image and
    /// the previous reference so the caller can remove the old file.
    pub async fn replace_image_file(
        &self,
        id: i32,
        reference: String,
    ) -> Result<(Image, String), CatalogError> {
        let length = reference.chars().count();
        if length == 0 || length > MAX_TEXT_LENGTH {
            return Err(ValidationError::new(
                "image",
                "length",
                "Image reference must be 1 to 255 characters",
            )
            .into());
        }

        let model = find_image(&self.db, id).await?;
        let previous = model.image.clone();

        let mut active_model = model.into_active_model();
        active_model.image = Set(reference);
        let model = active_model.update(&self.db).await?;

        tracing::info!("🖼️  Replaced file of image {}: {} -> {}", id, previous, model.image);

        let categories = related_categories(&self.db, &model).await?;
        Ok((Image::from_parts(model, categories)?, previous))
    }

    /// Deletes the image and its association rows. Categories are kept.
    pub async fn delete_image(&self, id: i32) -> Result<(), CatalogError> {
        let txn = self.db.begin().await?;

        let model = find_image(&txn, id).await?;
        ImageCategories::delete_many()
            .filter(image_categories::Column::ImageId.eq(id))
            .exec(&txn)
            .await?;
        model.delete(&txn).await?;

        txn.commit().await?;

        tracing::info!("🗑️  Deleted image {}", id);
        Ok(())
    }
}

pub(crate) async fn find_image<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<images::Model, CatalogError> {
    Images::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(CatalogError::NotFound { entity: "Image", id })
}

fn age_limit_column(value: i64) -> Result<i32, ValidationError> {
    i32::try_from(value)
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| {
            ValidationError::new(
                "age_limit",
                "range",
                "Age limit must be a non-negative integer",
            )
        })
}
