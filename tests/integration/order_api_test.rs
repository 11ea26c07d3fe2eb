// HTTP surface: routing, owner scoping, status codes

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use rust_decimal_macros::dec;
use serde_json::Value;

use helpers::*;
use storefront::middleware::OWNER_REF_HEADER;

#[actix_web::test]
async fn test_create_order_returns_201_with_order_number() {
    let h = Harness::new();
    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .insert_header((OWNER_REF_HEADER, OWNER))
        .set_json(full_order_request(dec!(120)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    let expected_prefix = format!("ORD-{}-", h.services.clock.today().format("%Y%m%d"));
    assert!(body["order_number"]
        .as_str()
        .unwrap()
        .starts_with(&expected_prefix));
    assert_eq!(body["owner_ref"], OWNER);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["payment_status"], "pending");
    assert_eq!(body["ready_to_ship"], false);
}

#[actix_web::test]
async fn test_missing_owner_header_is_401() {
    let h = Harness::new();
    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(full_order_request(dec!(120)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], 401);
}

#[actix_web::test]
async fn test_invalid_order_is_400() {
    let h = Harness::new();
    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let mut request = full_order_request(dec!(120));
    request.items.clear();

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .insert_header((OWNER_REF_HEADER, OWNER))
        .set_json(request)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_orders_are_scoped_to_owner() {
    let h = Harness::new();
    let order = h
        .services
        .orders
        .create_order(OWNER, full_order_request(dec!(60)))
        .await
        .unwrap();

    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{}", order.id))
        .insert_header((OWNER_REF_HEADER, OWNER))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], order.id.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{}", order.id))
        .insert_header((OWNER_REF_HEADER, "user-2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri("/api/orders/does-not-exist")
        .insert_header((OWNER_REF_HEADER, OWNER))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_payment_summary_endpoint() {
    let h = Harness::new();
    let order = h
        .services
        .orders
        .create_order_at(OWNER, three_by_hundred(day(2025, 1, 10)), at(2025, 1, 5, 9))
        .await
        .unwrap();

    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{}/payment", order.id))
        .insert_header((OWNER_REF_HEADER, OWNER))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["order_number"], "ORD-20250105-001");
    assert_eq!(body["plan_type"], "installment");
    assert_eq!(body["installment_count"], 3);
    assert_eq!(body["installments_paid"], 0);
    assert_eq!(body["installment_frequency"], "monthly");
    assert_eq!(body["next_installment_date"], "2025-01-10");
    assert_eq!(body["payment_identifier"], "****6789");
}

#[actix_web::test]
async fn test_pay_now_success_and_decline() {
    let h = Harness::new();
    let paid = h
        .services
        .orders
        .create_order(OWNER, full_order_request(dec!(45)))
        .await
        .unwrap();
    let declined = h
        .services
        .orders
        .create_order(OWNER, full_order_request(dec!(45)))
        .await
        .unwrap();
    h.provider.decline_order(&declined.id);

    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/pay-now", paid.id))
        .insert_header((OWNER_REF_HEADER, OWNER))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "completed");

    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/pay-now", declined.id))
        .insert_header((OWNER_REF_HEADER, OWNER))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "failed");
    assert_eq!(body["reason"], "card declined");
    assert!(body["retry_date"].is_null());

    // Already paid
    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/pay-now", paid.id))
        .insert_header((OWNER_REF_HEADER, OWNER))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Someone else's order
    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/pay-now", declined.id))
        .insert_header((OWNER_REF_HEADER, "user-2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    assert_eq!(h.provider.requests().len(), 2);
}

#[actix_web::test]
async fn test_health_and_readiness() {
    let h = Harness::new();
    let services = h.services.clone();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/ready").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["checks"]["ledger"], true);
}
