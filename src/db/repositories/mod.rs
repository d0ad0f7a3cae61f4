//! Repository layer: per-entity data access.
//!
//! Every repository borrows any SeaORM connection, so the same code runs
//! against the pool or inside a request transaction. Lookups return
//! `Ok(None)` for missing rows; translating absence into a 404 is the
//! caller's job.

pub mod association;
pub mod category;
pub mod chain;
pub mod object;
pub mod product;
pub mod project;

pub use association::{
    ObjectCategoryRepository, ProductCategoryRepository, ProjectCategoryRepository,
};
pub use category::{CategoryPatch, CategoryRepository, NewCategory};
pub use chain::{ChainPatch, ChainRepository, NewChain};
pub use object::{NewObject, ObjectPatch, ObjectRepository};
pub use product::{NewProduct, ProductPatch, ProductRepository};
pub use project::{NewProject, ProjectPatch, ProjectRepository};

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable patch field.
///
/// Used with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
