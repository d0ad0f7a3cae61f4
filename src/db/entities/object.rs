//! Object entity - a geolocated facility, optionally a branch of another object

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operational status of a facility, stored as an integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(try_from = "i32", into = "i32")]
pub enum ObjectStatus {
    #[sea_orm(num_value = 1)]
    Damaged,
    #[sea_orm(num_value = 2)]
    UnderAttack,
    #[sea_orm(num_value = 3)]
    Functional,
}

impl From<ObjectStatus> for i32 {
    fn from(status: ObjectStatus) -> Self {
        match status {
            ObjectStatus::Damaged => 1,
            ObjectStatus::UnderAttack => 2,
            ObjectStatus::Functional => 3,
        }
    }
}

impl TryFrom<i32> for ObjectStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ObjectStatus::Damaged),
            2 => Ok(ObjectStatus::UnderAttack),
            3 => Ok(ObjectStatus::Functional),
            other => Err(format!("invalid object status {}, expected 1, 2 or 3", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "objects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub ownership: Option<String>,
    pub area: f64,
    #[sea_orm(column_name = "object_status")]
    pub status: ObjectStatus,
    /// JSON array of URLs
    pub links: String,
    pub icon: Option<String>,
    pub image: Option<String>,
    /// JSON array of stored file names
    pub file_storage: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl Model {
    pub fn link_list(&self) -> Vec<String> {
        decode_list(&self.links)
    }

    pub fn stored_files(&self) -> Vec<String> {
        decode_list(&self.file_storage)
    }
}

/// Encode a string list for a JSON text column
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON text column; malformed content reads as an empty list
pub fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
