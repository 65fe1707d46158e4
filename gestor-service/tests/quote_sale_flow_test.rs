//! End-to-end flows for quotes, sales and payments over the JSON API.

mod common;

use common::TestApp;
use rust_decimal::Decimal;
use serde_json::json;
use serial_test::serial;
use std::str::FromStr;

fn money(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("money field should be a string")).unwrap()
}

async fn create_customer(app: &TestApp, name: &str) -> serde_json::Value {
    let response = app
        .post_json("/api/v1/customers", &json!({ "name": name }))
        .await;
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

async fn create_shirt_with_variant(app: &TestApp) -> (String, String) {
    let response = app
        .post_json(
            "/api/v1/products",
            &json!({
                "name": "Camiseta",
                "base_price": "50.00",
                "variants": [
                    { "name": "Azul", "price_modifier": "5.00" }
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let product: serde_json::Value = response.json().await.unwrap();
    let product_id = product["id"].as_str().unwrap().to_string();
    let variant_id = product["variants"][0]["id"].as_str().unwrap().to_string();
    (product_id, variant_id)
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app
        .client
        .get(format!("{}/api/v1/customers", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Usuário não autenticado");

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn quote_with_variant_prices_items_and_converts_to_sale() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Maria Silva").await;
    let customer_id = customer["id"].as_str().unwrap();
    let (product_id, variant_id) = create_shirt_with_variant(&app).await;

    // Three shirts at 50.00 + 5.00 modifier each.
    let response = app
        .post_json(
            "/api/v1/quotes",
            &json!({
                "customer_id": customer_id,
                "valid_until": "2026-09-30",
                "items": [
                    { "product_id": product_id, "variant_id": variant_id, "quantity": 3 }
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let quote: serde_json::Value = response.json().await.unwrap();
    assert_eq!(money(&quote["total_amount"]), Decimal::new(16500, 2));
    assert_eq!(quote["status"], "pending");
    assert!(quote["quote_number"].as_str().unwrap().starts_with("ORC-"));
    assert_eq!(quote["items"][0]["description"], "Camiseta - Azul");
    assert_eq!(money(&quote["items"][0]["unit_price"]), Decimal::new(5500, 2));

    let quote_id = quote["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/v1/quotes/{}/status", quote_id),
            &json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    // The converted status is reserved for the conversion flow.
    let response = app
        .put_json(
            &format!("/api/v1/quotes/{}/status", quote_id),
            &json!({ "status": "converted" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .post_json(&format!("/api/v1/quotes/{}/convert", quote_id), &json!({}))
        .await;
    assert_eq!(response.status(), 201);
    let sale: serde_json::Value = response.json().await.unwrap();
    assert_eq!(money(&sale["total_amount"]), Decimal::new(16500, 2));
    assert_eq!(sale["payment_status"], "pending");
    assert_eq!(sale["quote_id"].as_str().unwrap(), quote_id);
    assert!(sale["sale_number"].as_str().unwrap().starts_with("VND-"));
    assert_eq!(sale["items"].as_array().unwrap().len(), 1);

    let response = app.get(&format!("/api/v1/quotes/{}", quote_id)).await;
    let converted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(converted["status"], "converted");

    // A quote converts only once.
    let response = app
        .post_json(&format!("/api/v1/quotes/{}/convert", quote_id), &json!({}))
        .await;
    assert_eq!(response.status(), 409);

    let sale_id = sale["id"].as_str().unwrap();
    let response = app
        .post_json(&format!("/api/v1/sales/{}/complete", sale_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);
    let completed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(completed["payment_status"], "paid");

    let response = app.get("/api/v1/dashboard").await;
    let stats: serde_json::Value = response.json().await.unwrap();
    assert_eq!(stats["total_customers"], 1);
    assert_eq!(stats["total_products"], 1);
    assert_eq!(stats["pending_quotes"], 0);
    assert_eq!(stats["total_sales"], 1);
    assert_eq!(money(&stats["revenue"]), Decimal::new(16500, 2));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn converted_quote_is_locked_and_yields_a_single_sale() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Rita Alves").await;
    let customer_id = customer["id"].as_str().unwrap();
    let (product_id, _) = create_shirt_with_variant(&app).await;

    let response = app
        .post_json(
            "/api/v1/quotes",
            &json!({
                "customer_id": customer_id,
                "valid_until": "2026-09-30",
                "items": [ { "product_id": product_id, "quantity": 1 } ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let quote: serde_json::Value = response.json().await.unwrap();
    let quote_id = quote["id"].as_str().unwrap();

    let response = app
        .post_json(&format!("/api/v1/quotes/{}/convert", quote_id), &json!({}))
        .await;
    assert_eq!(response.status(), 201);

    // A converted quote never leaves that state.
    let response = app
        .put_json(
            &format!("/api/v1/quotes/{}/status", quote_id),
            &json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Orçamento convertido não pode ser alterado");

    let response = app.get(&format!("/api/v1/quotes/{}", quote_id)).await;
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched["status"], "converted");

    let response = app
        .post_json(&format!("/api/v1/quotes/{}/convert", quote_id), &json!({}))
        .await;
    assert_eq!(response.status(), 409);

    let response = app.get("/api/v1/sales").await;
    let sales: serde_json::Value = response.json().await.unwrap();
    assert_eq!(sales.as_array().unwrap().len(), 1);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn quote_accepts_an_explicit_issue_date() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Bruno Dias").await;
    let customer_id = customer["id"].as_str().unwrap();
    let (product_id, _) = create_shirt_with_variant(&app).await;

    let response = app
        .post_json(
            "/api/v1/quotes",
            &json!({
                "customer_id": customer_id,
                "issue_date": "2026-01-15",
                "valid_until": "2026-02-15",
                "items": [ { "product_id": product_id, "quantity": 1 } ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let quote: serde_json::Value = response.json().await.unwrap();
    assert_eq!(quote["issue_date"], "2026-01-15");

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn documents_survive_deleting_what_they_reference() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Sofia Ramos").await;
    let customer_id = customer["id"].as_str().unwrap().to_string();
    let (product_id, _) = create_shirt_with_variant(&app).await;

    let response = app
        .post_json(
            "/api/v1/quotes",
            &json!({
                "customer_id": customer_id,
                "valid_until": "2026-09-30",
                "items": [ { "product_id": product_id, "quantity": 1 } ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let quote: serde_json::Value = response.json().await.unwrap();
    let quote_id = quote["id"].as_str().unwrap().to_string();

    let response = app
        .post_json(&format!("/api/v1/quotes/{}/convert", quote_id), &json!({}))
        .await;
    assert_eq!(response.status(), 201);
    let sale: serde_json::Value = response.json().await.unwrap();
    let sale_id = sale["id"].as_str().unwrap().to_string();

    // The customer can be removed even with documents on file.
    let response = app
        .delete(&format!("/api/v1/customers/{}", customer_id))
        .await;
    assert_eq!(response.status(), 204);

    let response = app.get(&format!("/api/v1/sales/{}", sale_id)).await;
    assert_eq!(response.status(), 200);
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert!(fetched["customer_id"].is_null());

    // So can the quote a sale came from.
    let response = app.delete(&format!("/api/v1/quotes/{}", quote_id)).await;
    assert_eq!(response.status(), 204);

    let response = app.get(&format!("/api/v1/sales/{}", sale_id)).await;
    assert_eq!(response.status(), 200);
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert!(fetched["quote_id"].is_null());
    assert_eq!(money(&fetched["total_amount"]), Decimal::new(5000, 2));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn partial_payment_derives_receivable_and_completion_removes_it() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "João Santos").await;
    let customer_id = customer["id"].as_str().unwrap();

    let response = app
        .post_json(
            "/api/v1/products",
            &json!({ "name": "Conserto", "base_price": "200.00", "is_service": true }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let product: serde_json::Value = response.json().await.unwrap();
    let product_id = product["id"].as_str().unwrap();

    // 200.00 total, 80.00 up front.
    let response = app
        .post_json(
            "/api/v1/sales",
            &json!({
                "customer_id": customer_id,
                "sale_date": "2026-08-01",
                "payment_method": "pix",
                "payment": { "kind": "partial", "paid_amount": "80.00" },
                "items": [ { "product_id": product_id, "quantity": 1 } ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let sale: serde_json::Value = response.json().await.unwrap();
    assert_eq!(sale["payment_status"], "pending");
    let sale_id = sale["id"].as_str().unwrap();
    let sale_number = sale["sale_number"].as_str().unwrap();

    let response = app.get("/api/v1/receivables").await;
    let receivables: serde_json::Value = response.json().await.unwrap();
    let receivables = receivables.as_array().unwrap();
    assert_eq!(receivables.len(), 1);
    assert_eq!(money(&receivables[0]["amount"]), Decimal::new(12000, 2));
    assert_eq!(receivables[0]["due_date"], "2026-08-31");
    assert!(receivables[0]["notes"]
        .as_str()
        .unwrap()
        .contains(sale_number));
    assert_eq!(receivables[0]["sale_id"].as_str().unwrap(), sale_id);

    let response = app
        .post_json(&format!("/api/v1/sales/{}/complete", sale_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);

    let response = app.get("/api/v1/receivables").await;
    let receivables: serde_json::Value = response.json().await.unwrap();
    assert!(receivables.as_array().unwrap().is_empty());

    // The sale counts once: 200.00, not 200.00 + 120.00.
    let response = app.get("/api/v1/dashboard").await;
    let stats: serde_json::Value = response.json().await.unwrap();
    assert_eq!(money(&stats["revenue"]), Decimal::new(20000, 2));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn overpayment_is_rejected_and_nothing_is_persisted() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Ana Costa").await;
    let customer_id = customer["id"].as_str().unwrap();
    let (product_id, _) = create_shirt_with_variant(&app).await;

    let response = app
        .post_json(
            "/api/v1/sales",
            &json!({
                "customer_id": customer_id,
                "payment": { "kind": "partial", "paid_amount": "250.00" },
                "items": [ { "product_id": product_id, "quantity": 1 } ]
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app.get("/api/v1/sales").await;
    let sales: serde_json::Value = response.json().await.unwrap();
    assert!(sales.as_array().unwrap().is_empty());

    let response = app.get("/api/v1/receivables").await;
    let receivables: serde_json::Value = response.json().await.unwrap();
    assert!(receivables.as_array().unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn full_payment_settles_the_sale_with_no_receivable() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Pedro Lima").await;
    let customer_id = customer["id"].as_str().unwrap();
    let (product_id, variant_id) = create_shirt_with_variant(&app).await;

    let response = app
        .post_json(
            "/api/v1/sales",
            &json!({
                "customer_id": customer_id,
                "payment_method": "dinheiro",
                "payment": { "kind": "total" },
                "items": [
                    { "product_id": product_id, "variant_id": variant_id, "quantity": 2 }
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let sale: serde_json::Value = response.json().await.unwrap();
    assert_eq!(sale["payment_status"], "paid");
    assert_eq!(money(&sale["total_amount"]), Decimal::new(11000, 2));

    let response = app.get("/api/v1/receivables").await;
    let receivables: serde_json::Value = response.json().await.unwrap();
    assert!(receivables.as_array().unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn sale_requires_customer_and_items() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let customer = create_customer(&app, "Clara Nunes").await;
    let customer_id = customer["id"].as_str().unwrap();

    // No items.
    let response = app
        .post_json(
            "/api/v1/sales",
            &json!({
                "customer_id": customer_id,
                "payment": { "kind": "total" },
                "items": []
            }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Adicione pelo menos um item");

    // Unknown customer.
    let (product_id, _) = create_shirt_with_variant(&app).await;
    let response = app
        .post_json(
            "/api/v1/sales",
            &json!({
                "customer_id": uuid::Uuid::new_v4(),
                "payment": { "kind": "total" },
                "items": [ { "product_id": product_id, "quantity": 1 } ]
            }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Cliente é obrigatório");

    app.cleanup().await;
}
