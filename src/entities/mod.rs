pub mod prelude;

pub mod categories;
pub mod image_categories;
pub mod images;
