//! Chain handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::api::types::*;
use crate::api::AppState;
use crate::db::repositories::{
    ChainPatch, ChainRepository, NewChain, ObjectRepository, ProductRepository,
};
use crate::error::{OptionExt, Result, ServerError};

/// Check the endpoints and product a chain would reference
async fn require_chain_refs<C: ConnectionTrait>(
    db: &C,
    source: Uuid,
    target: Uuid,
    product: Option<Uuid>,
) -> Result<()> {
    let objects = ObjectRepository::new(db);
    objects.get_by_id(source).await?.or_not_found("Source object")?;
    objects.get_by_id(target).await?.or_not_found("Target object")?;
    if let Some(product_id) = product {
        ProductRepository::new(db)
            .get_by_id(product_id)
            .await?
            .or_not_found("Product")?;
    }
    Ok(())
}

/// GET /chains
pub async fn list_chains(State(state): State<Arc<AppState>>) -> Result<Json<ChainsResponse>> {
    let chains = ChainRepository::new(&state.db).get_all().await?;
    if chains.is_empty() {
        return Err(ServerError::NotFound("Chains".to_string()));
    }
    Ok(Json(ChainsResponse {
        chains: chains.into_iter().map(ChainResponse::from).collect(),
    }))
}

/// GET /chains/:id
pub async fn get_chain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChainResponse>> {
    let chain = ChainRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Chain")?;
    Ok(Json(chain.into()))
}

/// POST /chains
pub async fn create_chain(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewChain>,
) -> Result<Json<ChainResponse>> {
    require_chain_refs(
        &state.db,
        new.source_object_id,
        new.target_object_id,
        new.product_id,
    )
    .await?;
    let chain = ChainRepository::new(&state.db).create(new).await?;
    Ok(Json(chain.into()))
}

/// PUT /chains/:id
pub async fn update_chain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ChainPatch>,
) -> Result<Json<ChainResponse>> {
    let repo = ChainRepository::new(&state.db);
    let chain = repo.get_by_id(id).await?.or_not_found("Chain")?;

    require_chain_refs(
        &state.db,
        patch.source_object_id.unwrap_or(chain.source_object_id),
        patch.target_object_id.unwrap_or(chain.target_object_id),
        patch.product_id.unwrap_or(chain.product_id),
    )
    .await?;
    let chain = repo.update(chain, patch).await?;
    Ok(Json(chain.into()))
}

/// DELETE /chains/:id
pub async fn delete_chain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    if ChainRepository::new(&state.db).delete(id).await? == 0 {
        return Err(ServerError::NotFound("Chain".to_string()));
    }
    Ok(Json(DetailResponse::new("Chain deleted")))
}

/// GET /chains/by-product/:product_id
pub async fn chains_by_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ChainsByProductResponse>> {
    ProductRepository::new(&state.db)
        .get_by_id(product_id)
        .await?
        .or_not_found("Product")?;
    let chains = ChainRepository::new(&state.db).get_by_product(product_id).await?;
    Ok(Json(ChainsByProductResponse {
        product_id,
        chains: chains.into_iter().map(ChainResponse::from).collect(),
    }))
}

/// GET /chains/objects/by_product/:product_id - objects on the product's
/// chains, each with its outgoing chains and their target coordinates
pub async fn objects_by_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ObjectsWithChainsResponse>> {
    ProductRepository::new(&state.db)
        .get_by_id(product_id)
        .await?
        .or_not_found("Product")?;

    let objects = ObjectRepository::new(&state.db)
        .get_by_product_chains(product_id)
        .await?;
    if objects.is_empty() {
        return Err(ServerError::NotFound("Objects for product".to_string()));
    }

    let coords: HashMap<Uuid, (f64, f64)> = objects.iter().map(|o| (o.id, (o.x, o.y))).collect();
    let chains = ChainRepository::new(&state.db);

    let mut response = Vec::with_capacity(objects.len());
    for object in objects {
        let outgoing = chains
            .get_by_source(object.id, Some(product_id))
            .await?
            .into_iter()
            .filter_map(|chain| {
                let (target_x, target_y) = *coords.get(&chain.target_object_id)?;
                Some(ChainTargetResponse {
                    id: chain.id,
                    target_object_id: chain.target_object_id,
                    product_id: chain.product_id,
                    target_x,
                    target_y,
                })
            })
            .collect();
        response.push(ObjectWithChainsResponse {
            object: object.into(),
            chains: outgoing,
        });
    }

    Ok(Json(ObjectsWithChainsResponse { objects: response }))
}
