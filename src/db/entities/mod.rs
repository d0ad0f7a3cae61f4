//! Database entities

pub mod category;
pub mod chain;
pub mod object;
pub mod object_category;
pub mod product;
pub mod product_category;
pub mod project;
pub mod project_category;

