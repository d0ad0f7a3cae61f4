//! Object repository: facilities, their branches and category links.

use std::collections::{HashSet, VecDeque};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use super::association::ObjectCategoryRepository;
use super::double_option;
use crate::db::entities::object::{self, encode_list, ObjectStatus};
use crate::db::entities::{category, chain};

/// Fields for a new object
#[derive(Debug, Clone, Deserialize)]
pub struct NewObject {
    pub x: f64,
    pub y: f64,
    pub name: String,
    #[serde(default)]
    pub ownership: Option<String>,
    pub area: f64,
    pub status: ObjectStatus,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// Partial update; absent fields are left untouched, `null` clears
/// nullable ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectPatch {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub ownership: Option<Option<String>>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub status: Option<ObjectStatus>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<Uuid>>,
}

pub struct ObjectRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ObjectRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<object::Model>, DbErr> {
        object::Entity::find()
            .order_by_asc(object::Column::Name)
            .order_by_asc(object::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<object::Model>, DbErr> {
        object::Entity::find_by_id(id).one(self.db).await
    }

    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<object::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        object::Entity::find()
            .filter(object::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(object::Column::Name)
            .order_by_asc(object::Column::Id)
            .all(self.db)
            .await
    }

    /// Direct branches of an object
    pub async fn get_branches(&self, parent_id: Uuid) -> Result<Vec<object::Model>, DbErr> {
        object::Entity::find()
            .filter(object::Column::ParentId.eq(parent_id))
            .order_by_asc(object::Column::Name)
            .order_by_asc(object::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_by_project(&self, project_id: Uuid) -> Result<Vec<object::Model>, DbErr> {
        object::Entity::find()
            .filter(object::Column::ProjectId.eq(project_id))
            .order_by_asc(object::Column::Name)
            .order_by_asc(object::Column::Id)
            .all(self.db)
            .await
    }

    /// Objects at either end of a chain tagged with `product_id`
    pub async fn get_by_product_chains(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<object::Model>, DbErr> {
        let chains = chain::Entity::find()
            .filter(chain::Column::ProductId.eq(product_id))
            .all(self.db)
            .await?;
        let mut ids: Vec<Uuid> = chains
            .iter()
            .flat_map(|c| [c.source_object_id, c.target_object_id])
            .collect();
        ids.sort();
        ids.dedup();
        self.get_by_ids(&ids).await
    }

    pub async fn get_categories(&self, object_id: Uuid) -> Result<Vec<category::Model>, DbErr> {
        let mut categories: Vec<category::Model> = ObjectCategoryRepository::new(self.db)
            .get_by_object(object_id)
            .await?
            .into_iter()
            .map(|(_, category)| category)
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Replace the object's category associations
    pub async fn set_categories(&self, object_id: Uuid, category_ids: &[Uuid]) -> Result<(), DbErr> {
        ObjectCategoryRepository::new(self.db)
            .replace_for_object(object_id, category_ids)
            .await
    }

    pub async fn create(&self, new: NewObject) -> Result<object::Model, DbErr> {
        let model = object::ActiveModel {
            id: Set(Uuid::new_v4()),
            x: Set(new.x),
            y: Set(new.y),
            name: Set(new.name),
            ownership: Set(new.ownership),
            area: Set(new.area),
            status: Set(new.status),
            links: Set(encode_list(&new.links)),
            icon: Set(new.icon),
            image: Set(None),
            file_storage: Set(encode_list(&[])),
            description: Set(new.description),
            parent_id: Set(new.parent_id),
            project_id: Set(new.project_id),
        }
        .insert(self.db)
        .await?;
        tracing::info!("Created object {} ({})", model.name, model.id);
        Ok(model)
    }

    pub async fn update(
        &self,
        model: object::Model,
        patch: ObjectPatch,
    ) -> Result<object::Model, DbErr> {
        let mut active: object::ActiveModel = model.clone().into();
        if let Some(x) = patch.x {
            active.x = Set(x);
        }
        if let Some(y) = patch.y {
            active.y = Set(y);
        }
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(ownership) = patch.ownership {
            active.ownership = Set(ownership);
        }
        if let Some(area) = patch.area {
            active.area = Set(area);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(links) = patch.links {
            active.links = Set(encode_list(&links));
        }
        if let Some(icon) = patch.icon {
            active.icon = Set(icon);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(parent_id) = patch.parent_id {
            active.parent_id = Set(parent_id);
        }
        if let Some(project_id) = patch.project_id {
            active.project_id = Set(project_id);
        }
        if !active.is_changed() {
            return Ok(model);
        }
        active.update(self.db).await
    }

    pub async fn set_file_storage(
        &self,
        model: object::Model,
        files: &[String],
    ) -> Result<object::Model, DbErr> {
        let mut active: object::ActiveModel = model.into();
        active.file_storage = Set(encode_list(files));
        active.update(self.db).await
    }

    pub async fn set_image(
        &self,
        model: object::Model,
        image: Option<String>,
    ) -> Result<object::Model, DbErr> {
        let mut active: object::ActiveModel = model.into();
        active.image = Set(image);
        active.update(self.db).await
    }

    /// True when making `new_parent` the parent of `id` would close a loop
    pub async fn would_create_cycle(&self, id: Uuid, new_parent: Uuid) -> Result<bool, DbErr> {
        let mut seen = HashSet::new();
        let mut current = Some(new_parent);
        while let Some(cursor) = current {
            if cursor == id {
                return Ok(true);
            }
            if !seen.insert(cursor) {
                return Ok(false);
            }
            current = self.get_by_id(cursor).await?.and_then(|o| o.parent_id);
        }
        Ok(false)
    }

    /// `id` and all of its branches, recursively, parents first
    pub async fn subtree_ids(&self, id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            ordered.push(current);
            for branch in self.get_branches(current).await? {
                queue.push_back(branch.id);
            }
        }
        Ok(ordered)
    }

    /// Delete an object with its branches, their category links and every
    /// chain touching them. Returns the deleted object ids so stored files
    /// can be removed afterwards.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let ids = self.subtree_ids(id).await?;

        ObjectCategoryRepository::new(self.db)
            .delete_by_objects(&ids)
            .await?;

        chain::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(chain::Column::SourceObjectId.is_in(ids.iter().copied()))
                    .add(chain::Column::TargetObjectId.is_in(ids.iter().copied())),
            )
            .exec(self.db)
            .await?;

        for object_id in ids.iter().rev() {
            object::Entity::delete_by_id(*object_id).exec(self.db).await?;
        }

        tracing::info!("Deleted object {} with {} branches", id, ids.len() - 1);
        Ok(ids)
    }
}

#[cfg(test)]
impl NewObject {
    /// Minimal functional object at (x, y)
    pub fn named(name: &str, x: f64, y: f64) -> Self {
        NewObject {
            x,
            y,
            name: name.to_string(),
            ownership: None,
            area: 10.0,
            status: ObjectStatus::Functional,
            links: Vec::new(),
            icon: None,
            description: None,
            parent_id: None,
            project_id: None,
        }
    }
}
