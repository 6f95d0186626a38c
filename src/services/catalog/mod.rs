//! Persistent catalog of categories, images and the association between them.
//!
//! Every operation is an explicit call on [`CatalogStore`]; multi-row writes
//! run in a single transaction so they either fully apply or not at all.

use crate::utils::validation::ValidationError;
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;

pub mod associations;
pub mod categories;
pub mod images;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CatalogError::Validation(errors.into())
    }
}

#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
