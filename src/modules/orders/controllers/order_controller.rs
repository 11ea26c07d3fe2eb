use std::sync::Arc;

use actix_web::{web, HttpResponse};
use tracing::info;

use crate::core::error::AppError;
use crate::middleware::{OwnerPrincipal, RequestIdValue};
use crate::modules::installments::models::SettlementOutcome;
use crate::modules::installments::services::SettlementEngine;
use crate::modules::orders::models::CreateOrderRequest;
use crate::modules::orders::services::OrderService;

/// Create an order
/// POST /api/orders
pub async fn create_order(
    service: web::Data<Arc<OrderService>>,
    owner: OwnerPrincipal,
    request_id: RequestIdValue,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = service
        .create_order(owner.as_str(), request.into_inner())
        .await?;

    info!(
        request_id = %request_id.as_str(),
        order_id = %order.id,
        order_number = %order.order_number,
        "Checkout accepted"
    );

    Ok(HttpResponse::Created().json(order))
}

/// GET /api/orders/{id}
pub async fn get_order(
    service: web::Data<Arc<OrderService>>,
    owner: OwnerPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order = service
        .get_order_for_owner(&path.into_inner(), owner.as_str())
        .await?;

    Ok(HttpResponse::Ok().json(order))
}

/// Payment plan progress
/// GET /api/orders/{id}/payment
pub async fn get_payment_summary(
    service: web::Data<Arc<OrderService>>,
    owner: OwnerPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let summary = service
        .payment_summary(&path.into_inner(), owner.as_str())
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Charge the next installment (or the full total) immediately
/// POST /api/orders/{id}/pay-now
pub async fn pay_now(
    engine: web::Data<Arc<SettlementEngine>>,
    owner: OwnerPrincipal,
    request_id: RequestIdValue,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let outcome = engine.pay_now(&order_id, owner.as_str()).await?;

    info!(
        request_id = %request_id.as_str(),
        order_id = %order_id,
        outcome = outcome.label(),
        "Customer payment attempted"
    );

    let response = match outcome {
        SettlementOutcome::Failed { .. } => HttpResponse::PaymentRequired().json(outcome),
        _ => HttpResponse::Ok().json(outcome),
    };
    Ok(response)
}

/// Configure order routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .route("", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/payment", web::get().to(get_payment_summary))
            .route("/{id}/pay-now", web::post().to(pay_now)),
    );
}
