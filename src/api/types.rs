//! Request bodies and response shapes for the JSON API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::entities::object::ObjectStatus;
use crate::db::entities::{
    category, chain, object, object_category, product, product_category, project,
    project_category,
};
use crate::db::repositories::{NewObject, ObjectPatch, ProjectPatch};
use crate::tree::{TreeItem, TreeNode};

// ============================================================================
// Request Types
// ============================================================================

/// POST /projects request body
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// PUT /projects/:id request body
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(flatten)]
    pub patch: ProjectPatch,
    /// Replaces the project's categories when present
    #[serde(default)]
    pub category_ids: Option<Vec<Uuid>>,
}

/// POST /categories request body
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Links the new category to a project
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// POST /objects request body, also the `data` field of POST /objects/form
#[derive(Debug, Deserialize)]
pub struct CreateObjectRequest {
    #[serde(flatten)]
    pub object: NewObject,
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

/// PUT /objects/:id request body
#[derive(Debug, Deserialize)]
pub struct UpdateObjectRequest {
    #[serde(flatten)]
    pub patch: ObjectPatch,
    /// Replaces the object's categories when present
    #[serde(default)]
    pub categories: Option<Vec<Uuid>>,
}

/// POST /products request body
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub categories: Vec<Uuid>,
}

/// POST /products/ids request body
#[derive(Debug, Deserialize)]
pub struct ProductIdsRequest {
    pub ids: Vec<Uuid>,
}

/// POST /associations request body
#[derive(Debug, Deserialize)]
pub struct CreateAssociationRequest {
    pub object_id: Uuid,
    pub category_id: Uuid,
}

/// POST /associations/products request body
#[derive(Debug, Deserialize)]
pub struct CreateProductAssociationRequest {
    pub product_id: Uuid,
    pub category_id: Uuid,
}

/// POST /associations/projects request body
#[derive(Debug, Deserialize)]
pub struct CreateProjectAssociationRequest {
    pub project_id: Uuid,
    pub category_id: Uuid,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Plain acknowledgement for deletes
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<project::Model> for ProjectResponse {
    fn from(model: project::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectWithCategoriesResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectResponse>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            parent_id: model.parent_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}

/// Category with the objects linked to it
#[derive(Debug, Serialize)]
pub struct CategoryWithObjectsResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub objects: Vec<ObjectResponse>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesWithObjectsResponse {
    pub categories: Vec<CategoryWithObjectsResponse>,
}

#[derive(Debug, Serialize)]
pub struct ObjectResponse {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub ownership: Option<String>,
    pub area: f64,
    pub status: ObjectStatus,
    pub links: Vec<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
    pub file_storage: Vec<String>,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl From<object::Model> for ObjectResponse {
    fn from(model: object::Model) -> Self {
        let links = model.link_list();
        let file_storage = model.stored_files();
        Self {
            id: model.id,
            x: model.x,
            y: model.y,
            name: model.name,
            ownership: model.ownership,
            area: model.area,
            status: model.status,
            links,
            icon: model.icon,
            image: model.image,
            file_storage,
            description: model.description,
            parent_id: model.parent_id,
            project_id: model.project_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ObjectsResponse {
    pub objects: Vec<ObjectResponse>,
}

impl From<Vec<object::Model>> for ObjectsResponse {
    fn from(models: Vec<object::Model>) -> Self {
        Self {
            objects: models.into_iter().map(ObjectResponse::from).collect(),
        }
    }
}

/// Object with its categories and direct branches
#[derive(Debug, Serialize)]
pub struct ObjectWithCategoriesResponse {
    #[serde(flatten)]
    pub object: ObjectResponse,
    pub categories: Vec<CategoryResponse>,
    pub branches: Vec<ObjectResponse>,
}

/// Outgoing chain of an object, with where it leads
#[derive(Debug, Serialize)]
pub struct ChainTargetResponse {
    pub id: Uuid,
    pub target_object_id: Uuid,
    pub product_id: Option<Uuid>,
    pub target_x: f64,
    pub target_y: f64,
}

/// Object with its outgoing chains for one product
#[derive(Debug, Serialize)]
pub struct ObjectWithChainsResponse {
    #[serde(flatten)]
    pub object: ObjectResponse,
    pub chains: Vec<ChainTargetResponse>,
}

#[derive(Debug, Serialize)]
pub struct ObjectsWithChainsResponse {
    pub objects: Vec<ObjectWithChainsResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub country: Option<String>,
}

impl From<&product::Model> for ProductResponse {
    fn from(model: &product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            description: model.description.clone(),
            image: model.image.clone(),
            country: model.country.clone(),
        }
    }
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image: model.image,
            country: model.country,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductWithCategoriesResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductResponse>,
}

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub id: Uuid,
    pub source_object_id: Uuid,
    pub target_object_id: Uuid,
    pub product_id: Option<Uuid>,
}

impl From<chain::Model> for ChainResponse {
    fn from(model: chain::Model) -> Self {
        Self {
            id: model.id,
            source_object_id: model.source_object_id,
            target_object_id: model.target_object_id,
            product_id: model.product_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChainsResponse {
    pub chains: Vec<ChainResponse>,
}

#[derive(Debug, Serialize)]
pub struct ChainsByProductResponse {
    pub product_id: Uuid,
    pub chains: Vec<ChainResponse>,
}

/// Category tree node; `objects` holds child nodes followed by products
#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub id: Uuid,
    pub name: String,
    pub objects: Vec<TreeEntry>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TreeEntry {
    Category(TreeResponse),
    Product(ProductResponse),
}

impl From<TreeNode<'_>> for TreeResponse {
    fn from(node: TreeNode<'_>) -> Self {
        Self {
            id: node.id,
            name: node.name.to_string(),
            objects: node
                .objects
                .into_iter()
                .map(|item| match item {
                    TreeItem::Category(child) => TreeEntry::Category(child.into()),
                    TreeItem::Product(product) => TreeEntry::Product(product.into()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TreesResponse {
    pub categories: Vec<TreeResponse>,
}

#[derive(Debug, Serialize)]
pub struct AssociationResponse {
    pub id: Uuid,
    pub object_id: Uuid,
    pub category_id: Uuid,
}

impl From<object_category::Model> for AssociationResponse {
    fn from(model: object_category::Model) -> Self {
        Self {
            id: model.id,
            object_id: model.object_id,
            category_id: model.category_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssociationsByObjectResponse {
    pub object: ObjectResponse,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize)]
pub struct AssociationsByCategoryResponse {
    pub category: CategoryResponse,
    pub objects: Vec<ObjectResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProductAssociationResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub category_id: Uuid,
}

impl From<product_category::Model> for ProductAssociationResponse {
    fn from(model: product_category::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            category_id: model.category_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductAssociationsByProductResponse {
    pub product: ProductResponse,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProductAssociationsByCategoryResponse {
    pub category: CategoryResponse,
    pub products: Vec<ProductResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProjectAssociationResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub category_id: Uuid,
}

impl From<project_category::Model> for ProjectAssociationResponse {
    fn from(model: project_category::Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            category_id: model.category_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectAssociationsByProjectResponse {
    pub project: ProjectResponse,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProjectAssociationsByCategoryResponse {
    pub category: CategoryResponse,
    pub projects: Vec<ProjectResponse>,
}
