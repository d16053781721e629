//! Product and customization endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CustomizationId, ProductId};
use domain::{
    Customization, CustomizationChanges, NewCustomization, NewProduct, Product, ProductCategory,
    ProductChanges,
};
use serde::Deserialize;

use super::{AppState, parse_id};
use crate::error::ApiError;

/// POST /products
#[tracing::instrument(skip(state, req))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.catalog_service.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
}

#[derive(Debug, Deserialize)]
pub struct CustomizationFilter {
    #[serde(alias = "productId")]
    pub product_id: Option<String>,
}

/// GET /products: active products, newest first; `?category=` narrows the list.
#[tracing::instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(
        state.catalog_service.list_products(filter.category).await?,
    ))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product_id: ProductId = parse_id("product", &id)?;
    Ok(Json(state.catalog_service.get_product(product_id).await?))
}

/// PATCH /products/{id}
#[tracing::instrument(skip(state, changes))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<ProductChanges>,
) -> Result<Json<Product>, ApiError> {
    let product_id: ProductId = parse_id("product", &id)?;
    Ok(Json(
        state
            .catalog_service
            .update_product(product_id, changes)
            .await?,
    ))
}

/// DELETE /products/{id}: marks the product inactive.
#[tracing::instrument(skip(state))]
pub async fn remove_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let product_id: ProductId = parse_id("product", &id)?;
    state.catalog_service.deactivate_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /customizations: newest first; `?product_id=` narrows the list.
#[tracing::instrument(skip(state))]
pub async fn list_customizations(
    State(state): State<AppState>,
    Query(filter): Query<CustomizationFilter>,
) -> Result<Json<Vec<Customization>>, ApiError> {
    let product_id = filter
        .product_id
        .as_deref()
        .map(|raw| parse_id::<ProductId>("product", raw))
        .transpose()?;
    Ok(Json(
        state.catalog_service.list_customizations(product_id).await?,
    ))
}

/// POST /customizations: the price is always derived, never taken from the body.
#[tracing::instrument(skip(state, req))]
pub async fn create_customization(
    State(state): State<AppState>,
    Json(req): Json<NewCustomization>,
) -> Result<(StatusCode, Json<Customization>), ApiError> {
    let customization = state.catalog_service.create_customization(req).await?;
    Ok((StatusCode::CREATED, Json(customization)))
}

/// GET /customizations/{id}
#[tracing::instrument(skip(state))]
pub async fn get_customization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customization>, ApiError> {
    let customization_id: CustomizationId = parse_id("customization", &id)?;
    Ok(Json(
        state
            .catalog_service
            .get_customization(customization_id)
            .await?,
    ))
}

/// PATCH /customizations/{id}
#[tracing::instrument(skip(state, changes))]
pub async fn update_customization(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<CustomizationChanges>,
) -> Result<Json<Customization>, ApiError> {
    let customization_id: CustomizationId = parse_id("customization", &id)?;
    Ok(Json(
        state
            .catalog_service
            .update_customization(customization_id, changes)
            .await?,
    ))
}

/// DELETE /customizations/{id}
#[tracing::instrument(skip(state))]
pub async fn remove_customization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let customization_id: CustomizationId = parse_id("customization", &id)?;
    state
        .catalog_service
        .remove_customization(customization_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
