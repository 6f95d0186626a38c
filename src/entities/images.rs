use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub title: String,
    /// Storage reference, relative to the media root (e.g. `images/<uuid>-cat.jpg`).
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub image: String,
    pub created_date: Date,
    pub age_limit: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::image_categories::Entity")]
    ImageCategories,
}

impl Related<super::image_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImageCategories.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::image_categories::Relation::Categories.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::image_categories::Relation::Images.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
