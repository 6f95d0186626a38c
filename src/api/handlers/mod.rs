pub mod categories;
pub mod gallery;
pub mod health;
pub mod images;
