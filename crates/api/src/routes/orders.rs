//! Order endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{OrderId, UserId};
use domain::{CreateOrderRequest, Order, OrderStatus, OrderSummary};
use serde::Deserialize;

use super::{AppState, parse_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

/// POST /orders and POST /orders/checkout: price and place a new order.
#[tracing::instrument(skip(state, req), fields(user_id = %req.user_id, items = req.order_items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.order_service.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders: all orders, newest first; `?user_id=` narrows to one user.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = match filter.user_id {
        Some(user_id) => {
            state
                .order_service
                .list_orders_for_user(&UserId::new(user_id))
                .await?
        }
        None => state.order_service.list_orders().await?,
    };
    Ok(Json(orders))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id: OrderId = parse_id("order", &id)?;
    Ok(Json(state.order_service.get_order(order_id).await?))
}

/// GET /orders/user/{user_id}: orders of one user, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user_id = UserId::new(user_id);
    Ok(Json(state.order_service.list_orders_for_user(&user_id).await?))
}

/// PATCH /orders/{id}/status: move the order through its lifecycle.
#[tracing::instrument(skip(state, req), fields(requested = %req.status))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order_id: OrderId = parse_id("order", &id)?;
    let status: OrderStatus = req.status.parse()?;
    Ok(Json(
        state.order_service.update_status(order_id, status).await?,
    ))
}

/// GET /orders/{id}/summary
#[tracing::instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderSummary>, ApiError> {
    let order_id: OrderId = parse_id("order", &id)?;
    Ok(Json(state.order_service.get_summary(order_id).await?))
}
