//! Association repositories for the three category join tables.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::db::entities::{
    category, object, object_category, product, product_category, project, project_category,
};

/// Object↔category join rows
pub struct ObjectCategoryRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ObjectCategoryRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<object_category::Model>, DbErr> {
        object_category::Entity::find_by_id(id).one(self.db).await
    }

    /// Associations of one object, each with its category
    pub async fn get_by_object(
        &self,
        object_id: Uuid,
    ) -> Result<Vec<(object_category::Model, category::Model)>, DbErr> {
        let rows = object_category::Entity::find()
            .filter(object_category::Column::ObjectId.eq(object_id))
            .find_also_related(category::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, category)| category.map(|c| (assoc, c)))
            .collect())
    }

    /// Associations of one category, each with its object
    pub async fn get_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<(object_category::Model, object::Model)>, DbErr> {
        let rows = object_category::Entity::find()
            .filter(object_category::Column::CategoryId.eq(category_id))
            .find_also_related(object::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, object)| object.map(|o| (assoc, o)))
            .collect())
    }

    pub async fn create(
        &self,
        object_id: Uuid,
        category_id: Uuid,
    ) -> Result<object_category::Model, DbErr> {
        object_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            object_id: Set(object_id),
            category_id: Set(category_id),
        }
        .insert(self.db)
        .await
    }

    /// Replace every association of an object
    pub async fn replace_for_object(
        &self,
        object_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), DbErr> {
        self.delete_by_objects(&[object_id]).await?;
        for category_id in category_ids {
            self.create(object_id, *category_id).await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let res = object_category::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_objects(&self, object_ids: &[Uuid]) -> Result<u64, DbErr> {
        if object_ids.is_empty() {
            return Ok(0);
        }
        let res = object_category::Entity::delete_many()
            .filter(object_category::Column::ObjectId.is_in(object_ids.iter().copied()))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_categories(&self, category_ids: &[Uuid]) -> Result<u64, DbErr> {
        if category_ids.is_empty() {
            return Ok(0);
        }
        let res = object_category::Entity::delete_many()
            .filter(object_category::Column::CategoryId.is_in(category_ids.iter().copied()))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

/// Product↔category join rows
pub struct ProductCategoryRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProductCategoryRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<product_category::Model>, DbErr> {
        product_category::Entity::find_by_id(id).one(self.db).await
    }

    pub async fn get_by_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<(product_category::Model, category::Model)>, DbErr> {
        let rows = product_category::Entity::find()
            .filter(product_category::Column::ProductId.eq(product_id))
            .find_also_related(category::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, category)| category.map(|c| (assoc, c)))
            .collect())
    }

    pub async fn get_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<(product_category::Model, product::Model)>, DbErr> {
        let rows = product_category::Entity::find()
            .filter(product_category::Column::CategoryId.eq(category_id))
            .find_also_related(product::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, product)| product.map(|p| (assoc, p)))
            .collect())
    }

    /// Every association joined with its product, for tree building
    pub async fn get_all_with_products(&self) -> Result<Vec<(Uuid, product::Model)>, DbErr> {
        let rows = product_category::Entity::find()
            .find_also_related(product::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, product)| product.map(|p| (assoc.category_id, p)))
            .collect())
    }

    pub async fn create(
        &self,
        product_id: Uuid,
        category_id: Uuid,
    ) -> Result<product_category::Model, DbErr> {
        product_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            category_id: Set(category_id),
        }
        .insert(self.db)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let res = product_category::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_product(&self, product_id: Uuid) -> Result<u64, DbErr> {
        let res = product_category::Entity::delete_many()
            .filter(product_category::Column::ProductId.eq(product_id))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_categories(&self, category_ids: &[Uuid]) -> Result<u64, DbErr> {
        if category_ids.is_empty() {
            return Ok(0);
        }
        let res = product_category::Entity::delete_many()
            .filter(product_category::Column::CategoryId.is_in(category_ids.iter().copied()))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

/// Project↔category join rows
pub struct ProjectCategoryRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProjectCategoryRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<project_category::Model>, DbErr> {
        project_category::Entity::find_by_id(id).one(self.db).await
    }

    /// Associations of one project, each with its category
    pub async fn get_by_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<(project_category::Model, category::Model)>, DbErr> {
        let rows = project_category::Entity::find()
            .filter(project_category::Column::ProjectId.eq(project_id))
            .find_also_related(category::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, category)| category.map(|c| (assoc, c)))
            .collect())
    }

    /// Associations of one category, each with its project
    pub async fn get_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<(project_category::Model, project::Model)>, DbErr> {
        let rows = project_category::Entity::find()
            .filter(project_category::Column::CategoryId.eq(category_id))
            .find_also_related(project::Entity)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(assoc, project)| project.map(|p| (assoc, p)))
            .collect())
    }

    /// Root categories of a project, by name
    pub async fn get_categories(&self, project_id: Uuid) -> Result<Vec<category::Model>, DbErr> {
        let mut categories: Vec<category::Model> = self
            .get_by_project(project_id)
            .await?
            .into_iter()
            .map(|(_, category)| category)
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        category_id: Uuid,
    ) -> Result<project_category::Model, DbErr> {
        project_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            category_id: Set(category_id),
        }
        .insert(self.db)
        .await
    }

    pub async fn replace_for_project(
        &self,
        project_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), DbErr> {
        self.delete_by_project(project_id).await?;
        for category_id in category_ids {
            self.create(project_id, *category_id).await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let res = project_category::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_project(&self, project_id: Uuid) -> Result<u64, DbErr> {
        let res = project_category::Entity::delete_many()
            .filter(project_category::Column::ProjectId.eq(project_id))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_categories(&self, category_ids: &[Uuid]) -> Result<u64, DbErr> {
        if category_ids.is_empty() {
            return Ok(0);
        }
        let res = project_category::Entity::delete_many()
            .filter(project_category::Column::CategoryId.is_in(category_ids.iter().copied()))
            .exec(self.db)
            .await?;
        Ok(res.rows_affected)
    }
}
