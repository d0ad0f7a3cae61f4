//! Chain repository: directed links between objects

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use super::double_option;
use crate::db::entities::chain;

/// Fields for a new chain
#[derive(Debug, Clone, Deserialize)]
pub struct NewChain {
    pub source_object_id: Uuid,
    pub target_object_id: Uuid,
    #[serde(default)]
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainPatch {
    #[serde(default)]
    pub source_object_id: Option<Uuid>,
    #[serde(default)]
    pub target_object_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    pub product_id: Option<Option<Uuid>>,
}

pub struct ChainRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ChainRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<chain::Model>, DbErr> {
        chain::Entity::find().all(self.db).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<chain::Model>, DbErr> {
        chain::Entity::find_by_id(id).one(self.db).await
    }

    pub async fn get_by_product(&self, product_id: Uuid) -> Result<Vec<chain::Model>, DbErr> {
        chain::Entity::find()
            .filter(chain::Column::ProductId.eq(product_id))
            .all(self.db)
            .await
    }

    /// Outgoing chains of an object, optionally restricted to one product
    pub async fn get_by_source(
        &self,
        source_object_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<chain::Model>, DbErr> {
        let mut query =
            chain::Entity::find().filter(chain::Column::SourceObjectId.eq(source_object_id));
        if let Some(product_id) = product_id {
            query = query.filter(chain::Column::ProductId.eq(product_id));
        }
        query.all(self.db).await
    }

    pub async fn create(&self, new: NewChain) -> Result<chain::Model, DbErr> {
        let model = chain::ActiveModel {
            id: Set(Uuid::new_v4()),
            source_object_id: Set(new.source_object_id),
            target_object_id: Set(new.target_object_id),
            product_id: Set(new.product_id),
        }
        .insert(self.db)
        .await?;
        tracing::info!(
            "Created chain {} ({} -> {})",
            model.id,
            model.source_object_id,
            model.target_object_id
        );
        Ok(model)
    }

    pub async fn update(
        &self,
        model: chain::Model,
        patch: ChainPatch,
    ) -> Result<chain::Model, DbErr> {
        let mut active: chain::ActiveModel = model.clone().into();
        if let Some(source) = patch.source_object_id {
            active.source_object_id = Set(source);
        }
        if let Some(target) = patch.target_object_id {
            active.target_object_id = Set(target);
        }
        if let Some(product_id) = patch.product_id {
            active.product_id = Set(product_id);
        }
        if !active.is_changed() {
            return Ok(model);
        }
        active.update(self.db).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let res = chain::Entity::delete_by_id(id).exec(self.db).await?;
        if res.rows_affected > 0 {
            tracing::info!("Deleted chain {}", id);
        }
        Ok(res.rows_affected)
    }
}
