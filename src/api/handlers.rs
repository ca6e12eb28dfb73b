use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Value};

use crate::domain::order::{OrderCommandHandler, OrderError};

pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Order ingestion API",
        "status": "running",
        "endpoints": {
            "create": "POST /order",
            "get": "GET /order/{orderId}",
            "list": "GET /order/list/all",
        }
    }))
}

pub async fn create_order(
    handler: web::Data<OrderCommandHandler>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, OrderError> {
    let order = handler.create_order(&payload).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Order created successfully",
        "order": order,
    })))
}

pub async fn get_order(
    handler: web::Data<OrderCommandHandler>,
    path: web::Path<String>,
) -> Result<HttpResponse, OrderError> {
    let order = handler.get_order(&path).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn list_orders(
    handler: web::Data<OrderCommandHandler>,
) -> Result<HttpResponse, OrderError> {
    let orders = handler.list_orders().await?;

    Ok(HttpResponse::Ok().json(json!({
        "count": orders.len(),
        "orders": orders,
    })))
}

pub async fn health(handler: web::Data<OrderCommandHandler>) -> impl Responder {
    match handler.check_store().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "service": "order-ingest",
            "store": handler.store_backend(),
        })),
        Err(e) => {
            tracing::warn!(error = ?e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "service": "order-ingest",
                "store": handler.store_backend(),
            }))
        }
    }
}

pub async fn metrics(handler: web::Data<OrderCommandHandler>) -> HttpResponse {
    match handler.metrics().encode() {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(text),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
