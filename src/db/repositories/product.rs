//! Product repository

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use uuid::Uuid;

use super::association::ProductCategoryRepository;
use super::double_option;
use crate::db::entities::{category, chain, product};

/// Fields for a new product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub country: Option<String>,
}

/// Partial update; `null` clears a nullable column
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,
}

pub struct ProductRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProductRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<product::Model>, DbErr> {
        product::Entity::find()
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<product::Model>, DbErr> {
        product::Entity::find_by_id(id).one(self.db).await
    }

    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<product::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        product::Entity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_categories(&self, product_id: Uuid) -> Result<Vec<category::Model>, DbErr> {
        let mut categories: Vec<category::Model> = ProductCategoryRepository::new(self.db)
            .get_by_product(product_id)
            .await?
            .into_iter()
            .map(|(_, category)| category)
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub async fn create(&self, new: NewProduct) -> Result<product::Model, DbErr> {
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            description: Set(new.description),
            image: Set(new.image),
            country: Set(new.country),
        }
        .insert(self.db)
        .await?;
        tracing::info!("Created product {} ({})", model.name, model.id);
        Ok(model)
    }

    pub async fn update(
        &self,
        model: product::Model,
        patch: ProductPatch,
    ) -> Result<product::Model, DbErr> {
        let mut active: product::ActiveModel = model.clone().into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(image) = patch.image {
            active.image = Set(image);
        }
        if let Some(country) = patch.country {
            active.country = Set(country);
        }
        if !active.is_changed() {
            return Ok(model);
        }
        active.update(self.db).await
    }

    pub async fn set_image(
        &self,
        model: product::Model,
        image: Option<String>,
    ) -> Result<product::Model, DbErr> {
        let mut active: product::ActiveModel = model.into();
        active.image = Set(image);
        active.update(self.db).await
    }

    /// Delete a product and its category links. Chains tagged with the
    /// product stay, untagged.
    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        ProductCategoryRepository::new(self.db)
            .delete_by_product(id)
            .await?;

        chain::Entity::update_many()
            .col_expr(chain::Column::ProductId, Expr::value(Option::<Uuid>::None))
            .filter(chain::Column::ProductId.eq(id))
            .exec(self.db)
            .await?;

        let res = product::Entity::delete_by_id(id).exec(self.db).await?;
        if res.rows_affected > 0 {
            tracing::info!("Deleted product {}", id);
        }
        Ok(res.rows_affected)
    }
}
