// Private module declarations
mod error;
mod handlers;
mod server;

use actix_web::web;

// Re-export for public API
pub use server::start_server;

/// Register all routes. `/order/list/all` has more segments than
/// `/order/{order_id}`, so the two never collide.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(handlers::metrics))
        .route("/order", web::post().to(handlers::create_order))
        .route("/orders", web::post().to(handlers::create_order))
        .route("/order/list/all", web::get().to(handlers::list_orders))
        .route("/order/{order_id}", web::get().to(handlers::get_order));
}

pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(error::json_error_handler)
}

// ============================================================================
// HTTP Tests
// ============================================================================
