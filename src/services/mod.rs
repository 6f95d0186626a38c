pub mod catalog;
pub mod gallery;
pub mod storage;
