use crate::entities::{prelude::*, *};
use crate::models::{Category, CategoryUpdate, NewCategory};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use validator::Validate;

use super::{CatalogError, CatalogStore};

impl CatalogStore {
    pub async fn create_category(&self, input: NewCategory) -> Result<Category, CatalogError> {
        input.validate()?;

        let model = categories::ActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!("🏷️  Created category {} ({})", model.id, model.name);
        Ok(model.into())
    }

    pub async fn get_category(&self, id: i32) -> Result<Category, CatalogError> {
        find_category(&self.db, id).await.map(Category::from)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn count_categories(&self) -> Result<u64, CatalogError> {
        Ok(Categories::find().count(&self.db).await?)
    }

    /// Applies the supplied fields only; an empty update returns the row unchanged.
    pub async fn update_category(
        &self,
        id: i32,
        update: CategoryUpdate,
    ) -> Result<Category, CatalogError> {
        update.validate()?;

        let model = find_category(&self.db, id).await?;
        let Some(name) = update.name else {
            return Ok(model.into());
        };

        let mut active_model = model.into_active_model();
        active_model.name = Set(name);
        let res = active_model.update(&self.db).await?;

        tracing::info!("🏷️  Updated category {}", res.id);
        Ok(res.into())
    }

    /// Deletes the category and detaches it from every image. Images are kept.
    pub async fn delete_category(&self, id: i32) -> Result<(), CatalogError> {
        let txn = self.db.begin().await?;

        let model = find_category(&txn, id).await?;
        let detached = ImageCategories::delete_many()
            .filter(image_categories::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        model.delete(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            "🗑️  Deleted category {} (detached from {} images)",
            id,
            detached.rows_affected
        );
        Ok(())
    }
}

pub(crate) async fn find_category<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<categories::Model, CatalogError> {
    Categories::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "Category",
            id,
        })
}

/// Loads the requested categories, failing on the first id with no row.
/// Duplicate ids collapse to one entry; the result is ordered by id.
pub(crate) async fn load_categories<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<Vec<categories::Model>, CatalogError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = Categories::find()
        .filter(categories::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(categories::Column::Id)
        .all(conn)
        .await?;

    if let Some(&missing) = ids.iter().find(|id| !rows.iter().any(|c| c.id == **id)) {
        return Err(CatalogError::NotFound {
            entity: "Category",
            id: missing,
        });
    }

    Ok(rows)
}
