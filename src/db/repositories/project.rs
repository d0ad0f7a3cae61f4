//! Project repository

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use uuid::Uuid;

use super::association::ProjectCategoryRepository;
use super::double_option;
use crate::db::entities::{category, object, project};

/// Fields for a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

pub struct ProjectRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProjectRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<project::Model>, DbErr> {
        project::Entity::find()
            .order_by_asc(project::Column::Name)
            .order_by_asc(project::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<project::Model>, DbErr> {
        project::Entity::find_by_id(id).one(self.db).await
    }

    pub async fn get_categories(&self, project_id: Uuid) -> Result<Vec<category::Model>, DbErr> {
        ProjectCategoryRepository::new(self.db)
            .get_categories(project_id)
            .await
    }

    pub async fn set_categories(
        &self,
        project_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), DbErr> {
        ProjectCategoryRepository::new(self.db)
            .replace_for_project(project_id, category_ids)
            .await
    }

    pub async fn create(&self, new: NewProject) -> Result<project::Model, DbErr> {
        let model = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            description: Set(new.description),
        }
        .insert(self.db)
        .await?;
        tracing::info!("Created project {} ({})", model.name, model.id);
        Ok(model)
    }

    pub async fn update(
        &self,
        model: project::Model,
        patch: ProjectPatch,
    ) -> Result<project::Model, DbErr> {
        let mut active: project::ActiveModel = model.clone().into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if !active.is_changed() {
            return Ok(model);
        }
        active.update(self.db).await
    }

    /// Delete a project. Its objects survive with `project_id` cleared.
    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        ProjectCategoryRepository::new(self.db)
            .delete_by_project(id)
            .await?;

        object::Entity::update_many()
            .col_expr(object::Column::ProjectId, Expr::value(Option::<Uuid>::None))
            .filter(object::Column::ProjectId.eq(id))
            .exec(self.db)
            .await?;

        let res = project::Entity::delete_by_id(id).exec(self.db).await?;
        if res.rows_affected > 0 {
            tracing::info!("Deleted project {}", id);
        }
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::test_db;
    use crate::db::repositories::{
        CategoryRepository, NewCategory, NewObject, ObjectRepository,
    };

    #[tokio::test]
    async fn test_categories_replace() {
        let (_dir, db) = test_db().await;
        let repo = ProjectRepository::new(&db);
        let categories = CategoryRepository::new(&db);

        let project = repo
            .create(NewProject {
                name: "North".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let roads = categories
            .create(NewCategory { name: "Roads".into(), parent_id: None })
            .await
            .unwrap();
        let docks = categories
            .create(NewCategory { name: "Docks".into(), parent_id: None })
            .await
            .unwrap();

        repo.set_categories(project.id, &[roads.id, docks.id]).await.unwrap();
        let names: Vec<String> = repo
            .get_categories(project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Docks", "Roads"]);

        repo.set_categories(project.id, &[]).await.unwrap();
        assert!(repo.get_categories(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_detaches_objects() {
        let (_dir, db) = test_db().await;
        let repo = ProjectRepository::new(&db);
        let project = repo
            .create(NewProject {
                name: "South".to_string(),
                description: Some("coastal".to_string()),
            })
            .await
            .unwrap();

        let objects = ObjectRepository::new(&db);
        let mut new = NewObject::named("Harbour", 0.0, 0.0);
        new.project_id = Some(project.id);
        let harbour = objects.create(new).await.unwrap();
        assert_eq!(objects.get_by_project(project.id).await.unwrap().len(), 1);

        assert_eq!(repo.delete(project.id).await.unwrap(), 1);
        assert!(repo.get_by_id(project.id).await.unwrap().is_none());
        let harbour = objects.get_by_id(harbour.id).await.unwrap().unwrap();
        assert_eq!(harbour.project_id, None);
    }

    #[tokio::test]
    async fn test_update_description() {
        let (_dir, db) = test_db().await;
        let repo = ProjectRepository::new(&db);
        let project = repo
            .create(NewProject {
                name: "East".to_string(),
                description: Some("inland".to_string()),
            })
            .await
            .unwrap();

        let patch: ProjectPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let updated = repo.update(project, patch).await.unwrap();
        assert_eq!(updated.name, "East");
        assert_eq!(updated.description, None);
    }
}
