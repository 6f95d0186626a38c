pub use super::categories::Entity as Categories;
pub use super::image_categories::Entity as ImageCategories;
pub use super::images::Entity as Images;
