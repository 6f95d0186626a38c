use crate::entities::{prelude::*, *};
use crate::models::Category;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashSet;

use super::categories::load_categories;
use super::images::find_image;
use super::{CatalogError, CatalogStore};

impl CatalogStore {
    /// Adds categories to an image. Pairs that already exist are left alone,
    /// so repeating the call is a no-op. Returns the resulting set.
    pub async fn add_categories(
        &self,
        image_id: i32,
        category_ids: &[i32],
    ) -> Result<Vec<Category>, CatalogError> {
        let txn = self.db.begin().await?;

        let image = find_image(&txn, image_id).await?;
        let wanted = load_categories(&txn, category_ids).await?;

        let existing: HashSet<i32> = ImageCategories::find()
            .filter(image_categories::Column::ImageId.eq(image_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| row.category_id)
            .collect();

        let missing: Vec<i32> = wanted
            .iter()
            .map(|c| c.id)
            .filter(|id| !existing.contains(id))
            .collect();
        link_categories(&txn, image_id, &missing).await?;

        let categories = related_categories(&txn, &image).await?;
        txn.commit().await?;

        tracing::debug!(
            "Image {}: linked {} new categories ({} total)",
            image_id,
            missing.len(),
            categories.len()
        );
        Ok(categories.into_iter().map(Category::from).collect())
    }

    /// Detaches one category from an image. Removing an absent pair is a no-op.
    pub async fn remove_category(&self, image_id: i32, category_id: i32) -> Result<(), CatalogError> {
        find_image(&self.db, image_id).await?;

        let res = ImageCategories::delete_many()
            .filter(image_categories::Column::ImageId.eq(image_id))
            .filter(image_categories::Column::CategoryId.eq(category_id))
            .exec(&self.db)
            .await?;

        tracing::debug!(
            "Image {}: removed category {} ({} rows)",
            image_id,
            category_id,
            res.rows_affected
        );
        Ok(())
    }

    /// Detaches every category from an image and returns how many were removed.
    pub async fn clear_categories(&self, image_id: i32) -> Result<u64, CatalogError> {
        find_image(&self.db, image_id).await?;

        let res = ImageCategories::delete_many()
            .filter(image_categories::Column::ImageId.eq(image_id))
            .exec(&self.db)
            .await?;

        tracing::debug!("Image {}: cleared {} categories", image_id, res.rows_affected);
        Ok(res.rows_affected)
    }

    /// Replaces the image's category set with exactly `category_ids`.
    pub async fn set_categories(
        &self,
        image_id: i32,
        category_ids: &[i32],
    ) -> Result<Vec<Category>, CatalogError> {
        let txn = self.db.begin().await?;

        find_image(&txn, image_id).await?;
        let wanted = load_categories(&txn, category_ids).await?;

        ImageCategories::delete_many()
            .filter(image_categories::Column::ImageId.eq(image_id))
            .exec(&txn)
            .await?;
        let ids: Vec<i32> = wanted.iter().map(|c| c.id).collect();
        link_categories(&txn, image_id, &ids).await?;

        txn.commit().await?;

        Ok(wanted.into_iter().map(Category::from).collect())
    }

    pub async fn image_categories(&self, image_id: i32) -> Result<Vec<Category>, CatalogError> {
        let image = find_image(&self.db, image_id).await?;
        let categories = related_categories(&self.db, &image).await?;
        Ok(categories.into_iter().map(Category::from).collect())
    }
}

/// Inserts one association row per id. Pairs that already exist, including
/// ones committed concurrently, are skipped.
pub(crate) async fn link_categories<C: ConnectionTrait>(
    conn: &C,
    image_id: i32,
    category_ids: &[i32],
) -> Result<(), CatalogError> {
    if category_ids.is_empty() {
        return Ok(());
    }

    let rows = category_ids.iter().map(|&category_id| image_categories::ActiveModel {
        image_id: Set(image_id),
        category_id: Set(category_id),
    });
    let res = ImageCategories::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                image_categories::Column::ImageId,
                image_categories::Column::CategoryId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await;

    match res {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn related_categories<C: ConnectionTrait>(
    conn: &C,
    image: &images::Model,
) -> Result<Vec<categories::Model>, CatalogError> {
    Ok(image
        .find_related(Categories)
        .order_by_asc(categories::Column::Id)
        .all(conn)
        .await?)
}
