//! HTTP and WebSocket server for the order processing core.
//!
//! Provides REST endpoints for orders, products and customizations, a
//! WebSocket gateway for live order events, structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use domain::{
    CatalogLookup, CatalogService, CustomizationRepository, EventSink, FanoutSink,
    InMemoryCatalog, InMemoryOrderRepository, OrderRepository, OrderService, PricingEngine,
    ProductRepository, TracingEventSink,
};
use hub::{Hub, OrderEventPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            post(routes::orders::create).get(routes::orders::list),
        )
        .route("/orders/checkout", post(routes::orders::create))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/user/{user_id}", get(routes::orders::list_for_user))
        .route("/orders/{id}/status", patch(routes::orders::update_status))
        .route("/orders/{id}/summary", get(routes::orders::summary))
        .route(
            "/products",
            post(routes::catalog::create_product).get(routes::catalog::list_products),
        )
        .route(
            "/products/{id}",
            get(routes::catalog::get_product)
                .patch(routes::catalog::update_product)
                .delete(routes::catalog::remove_product),
        )
        .route(
            "/customizations",
            post(routes::catalog::create_customization)
                .get(routes::catalog::list_customizations),
        )
        .route(
            "/customizations/{id}",
            get(routes::catalog::get_customization)
                .patch(routes::catalog::update_customization)
                .delete(routes::catalog::remove_customization),
        )
        .route("/ws", get(routes::ws::upgrade))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires services over the given repositories.
///
/// Order events go to the hub and to the tracing log.
pub fn build_state(
    products: Arc<dyn ProductRepository>,
    customizations: Arc<dyn CustomizationRepository>,
    orders: Arc<dyn OrderRepository>,
    hub: Hub,
) -> AppState {
    let sink: Arc<dyn EventSink> = Arc::new(
        FanoutSink::new()
            .with(Arc::new(OrderEventPublisher::new(hub.clone())))
            .with(Arc::new(TracingEventSink)),
    );
    let pricing = PricingEngine::new(CatalogLookup::new(
        products.clone(),
        customizations.clone(),
    ));

    AppState {
        order_service: OrderService::new(pricing, orders, sink),
        catalog_service: CatalogService::new(products, customizations),
        hub,
    }
}

/// Creates the default application state over in-memory repositories.
pub fn create_default_state(hub: Hub) -> AppState {
    let catalog = Arc::new(InMemoryCatalog::new());
    build_state(
        catalog.clone(),
        catalog,
        Arc::new(InMemoryOrderRepository::new()),
        hub,
    )
}
