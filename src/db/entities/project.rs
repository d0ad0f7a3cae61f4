//! Project entity - groups categories and objects

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_category::Entity")]
    ProjectCategories,
}

impl Related<super::project_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
