//! Category repository: tree-shaped categories with cascading delete.

use std::collections::{HashSet, VecDeque};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use uuid::Uuid;

use super::association::{
    ObjectCategoryRepository, ProductCategoryRepository, ProjectCategoryRepository,
};
use super::double_option;
use crate::db::entities::category;
use crate::tree::CategoryForest;

/// Fields for a new category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

pub struct CategoryRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CategoryRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<category::Model>, DbErr> {
        category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<category::Model>, DbErr> {
        category::Entity::find_by_id(id).one(self.db).await
    }

    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<category::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        category::Entity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<category::Model>, DbErr> {
        category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db)
            .await
    }

    pub async fn get_children(&self, parent_id: Uuid) -> Result<Vec<category::Model>, DbErr> {
        category::Entity::find()
            .filter(category::Column::ParentId.eq(parent_id))
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(self.db)
            .await
    }

    /// Snapshot of every category with its products, for the tree builder
    pub async fn load_forest(&self) -> Result<CategoryForest, DbErr> {
        let categories = category::Entity::find().all(self.db).await?;
        let assignments = ProductCategoryRepository::new(self.db)
            .get_all_with_products()
            .await?;
        Ok(CategoryForest::new(categories, assignments))
    }

    pub async fn create(&self, new: NewCategory) -> Result<category::Model, DbErr> {
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            parent_id: Set(new.parent_id),
        }
        .insert(self.db)
        .await?;
        tracing::info!("Created category {} ({})", model.name, model.id);
        Ok(model)
    }

    pub async fn update(
        &self,
        model: category::Model,
        patch: CategoryPatch,
    ) -> Result<category::Model, DbErr> {
        let mut active: category::ActiveModel = model.clone().into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(parent_id) = patch.parent_id {
            active.parent_id = Set(parent_id);
        }
        if !active.is_changed() {
            return Ok(model);
        }
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
                // existing loop not involving `id`
                return Ok(false);
            }
            current = self.get_by_id(cursor).await?.and_then(|c| c.parent_id);
        }
        Ok(false)
    }

    /// `id` and every category below it, parents before children
    pub async fn subtree_ids(&self, id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            ordered.push(current);
            for child in self.get_children(current).await? {
                queue.push_back(child.id);
            }
        }
        Ok(ordered)
    }

    /// Delete a category, its descendants and every association row
    /// referencing any of them. Returns the deleted category ids.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let ids = self.subtree_ids(id).await?;

        ObjectCategoryRepository::new(self.db)
            .delete_by_categories(&ids)
            .await?;
        ProductCategoryRepository::new(self.db)
            .delete_by_categories(&ids)
            .await?;
        ProjectCategoryRepository::new(self.db)
            .delete_by_categories(&ids)
            .await?;

        // children first so no row points at a deleted parent
        for category_id in ids.iter().rev() {
            category::Entity::delete_by_id(*category_id)
                .exec(self.db)
                .await?;
        }

        tracing::info!("Deleted category {} with {} descendants", id, ids.len() - 1);
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::test_db;
    use crate::db::repositories::{
        NewObject, NewProduct, ObjectRepository, ProductRepository,
    };
    use crate::tree::build_filtered_tree;

    async fn create(
        repo: &CategoryRepository<'_, sea_orm::DatabaseConnection>,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> category::Model {
        repo.create(NewCategory {
            name: name.to_string(),
            parent_id,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (_dir, db) = test_db().await;
        let repo = CategoryRepository::new(&db);

        let root = create(&repo, "Materials", None).await;
        let child = create(&repo, "Metals", Some(root.id)).await;

        assert_eq!(repo.get_by_id(child.id).await.unwrap().unwrap().parent_id, Some(root.id));
        assert_eq!(repo.get_by_name("Materials").await.unwrap().unwrap().id, root.id);
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());

        assert_eq!(repo.get_children(root.id).await.unwrap()[0].id, child.id);
        assert_eq!(repo.get_by_ids(&[root.id, child.id]).await.unwrap().len(), 2);
        assert!(repo.get_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let (_dir, db) = test_db().await;
        let repo = CategoryRepository::new(&db);

        create(&repo, "Fuel", None).await;
        let err = repo
            .create(NewCategory {
                name: "Fuel".to_string(),
                parent_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let (_dir, db) = test_db().await;
        let repo = CategoryRepository::new(&db);

        let root = create(&repo, "Root", None).await;
        let child = create(&repo, "Child", Some(root.id)).await;

        let renamed = repo
            .update(
                child.clone(),
                CategoryPatch {
                    name: Some("Renamed".to_string()),
                    parent_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.parent_id, Some(root.id));

        let detached = repo
            .update(
                renamed,
                CategoryPatch {
                    name: None,
                    parent_id: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(detached.parent_id, None);

        let unchanged = repo.update(detached.clone(), CategoryPatch::default()).await.unwrap();
        assert_eq!(unchanged, detached);
    }

    #[tokio::test]
    async fn test_would_create_cycle() {
        let (_dir, db) = test_db().await;
        let repo = CategoryRepository::new(&db);

        let a = create(&repo, "A", None).await;
        let b = create(&repo, "B", Some(a.id)).await;
        let c = create(&repo, "C", Some(b.id)).await;
        let other = create(&repo, "Other", None).await;

        assert!(repo.would_create_cycle(a.id, c.id).await.unwrap());
        assert!(repo.would_create_cycle(a.id, a.id).await.unwrap());
        assert!(!repo.would_create_cycle(c.id, other.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_children_and_associations() {
        let (_dir, db) = test_db().await;
        let repo = CategoryRepository::new(&db);

        let root = create(&repo, "Root", None).await;
        let child = create(&repo, "Child", Some(root.id)).await;
        let keep = create(&repo, "Keep", None).await;

        let product = ProductRepository::new(&db)
            .create(NewProduct {
                name: "Steel Beam".to_string(),
                description: None,
                image: None,
                country: None,
            })
            .await
            .unwrap();
        let object = ObjectRepository::new(&db)
            .create(NewObject::named("Depot", 1.0, 2.0))
            .await
            .unwrap();

        let product_assocs = ProductCategoryRepository::new(&db);
        let object_assocs = ObjectCategoryRepository::new(&db);
        product_assocs.create(product.id, child.id).await.unwrap();
        product_assocs.create(product.id, keep.id).await.unwrap();
        object_assocs.create(object.id, root.id).await.unwrap();

        let deleted = repo.delete(root.id).await.unwrap();
        assert_eq!(deleted, vec![root.id, child.id]);

        assert!(repo.get_by_id(child.id).await.unwrap().is_none());
        assert!(object_assocs.get_by_category(root.id).await.unwrap().is_empty());
        assert!(product_assocs.get_by_category(child.id).await.unwrap().is_empty());
        // unrelated rows survive
        assert_eq!(product_assocs.get_by_category(keep.id).await.unwrap().len(), 1);
        assert!(ProductRepository::new(&db).get_by_id(product.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_load_forest_feeds_tree_builder() {
        let (_dir, db) = test_db().await;
        let repo = CategoryRepository::new(&db);

        let c1 = create(&repo, "C1", None).await;
        let c2 = create(&repo, "C2", Some(c1.id)).await;
        let p1 = ProductRepository::new(&db)
            .create(NewProduct {
                name: "Steel Beam".to_string(),
                description: None,
                image: None,
                country: None,
            })
            .await
            .unwrap();
        ProductCategoryRepository::new(&db)
            .create(p1.id, c2.id)
            .await
            .unwrap();

        let forest = repo.load_forest().await.unwrap();
        assert_eq!(forest.roots(), &[c1.id]);
        assert_eq!(forest.products(c2.id)[0].id, p1.id);

        let tree = build_filtered_tree(&forest, c1.id, None).unwrap();
        assert_eq!(tree.objects.len(), 1);
    }
}
