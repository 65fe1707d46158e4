//! Receivables, payables, transactions and store settings over the JSON API.

mod common;

use common::TestApp;
use rust_decimal::Decimal;
use serde_json::json;
use serial_test::serial;
use std::str::FromStr;

fn money(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("money field should be a string")).unwrap()
}

#[tokio::test]
#[serial]
async fn payables_settle_and_count_as_expenses() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app
        .post_json(
            "/api/v1/payables",
            &json!({
                "supplier_name": "Fornecedor X",
                "amount": "50.00",
                "due_date": "2026-09-10",
                "category": "material"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let payable: serde_json::Value = response.json().await.unwrap();
    assert_eq!(payable["status"], "pending");
    assert!(payable["paid_date"].is_null());
    let payable_id = payable["id"].as_str().unwrap();

    let response = app
        .post_json(&format!("/api/v1/payables/{}/pay", payable_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);
    let paid: serde_json::Value = response.json().await.unwrap();
    assert_eq!(paid["status"], "paid");
    assert!(paid["paid_date"].is_string());

    let response = app.get("/api/v1/dashboard").await;
    let stats: serde_json::Value = response.json().await.unwrap();
    assert_eq!(money(&stats["expenses"]), Decimal::new(5000, 2));
    assert_eq!(money(&stats["balance"]), Decimal::new(-5000, 2));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn standalone_receivables_count_once_settled() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app
        .post_json(
            "/api/v1/receivables",
            &json!({ "amount": "30.00", "due_date": "2026-09-15" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let receivable: serde_json::Value = response.json().await.unwrap();
    let receivable_id = receivable["id"].as_str().unwrap();

    // Pending receivables are not revenue yet.
    let response = app.get("/api/v1/dashboard").await;
    let stats: serde_json::Value = response.json().await.unwrap();
    assert_eq!(money(&stats["revenue"]), Decimal::ZERO);

    let response = app
        .post_json(
            &format!("/api/v1/receivables/{}/pay", receivable_id),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app.get("/api/v1/dashboard").await;
    let stats: serde_json::Value = response.json().await.unwrap();
    assert_eq!(money(&stats["revenue"]), Decimal::new(3000, 2));

    let response = app
        .delete(&format!("/api/v1/receivables/{}", receivable_id))
        .await;
    assert_eq!(response.status(), 204);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn transactions_are_recorded_and_deleted() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app
        .post_json(
            "/api/v1/transactions",
            &json!({
                "type": "income",
                "amount": "100.00",
                "description": "Venda avulsa"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let income: serde_json::Value = response.json().await.unwrap();
    assert_eq!(income["type"], "income");
    assert!(income["transaction_date"].is_string());

    let response = app
        .post_json(
            "/api/v1/transactions",
            &json!({
                "type": "expense",
                "amount": "40.00",
                "description": "Frete",
                "transaction_date": "2026-08-20"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let expense: serde_json::Value = response.json().await.unwrap();
    assert_eq!(expense["transaction_date"], "2026-08-20");

    let response = app.get("/api/v1/transactions").await;
    let transactions: serde_json::Value = response.json().await.unwrap();
    assert_eq!(transactions.as_array().unwrap().len(), 2);

    let response = app
        .delete(&format!(
            "/api/v1/transactions/{}",
            expense["id"].as_str().unwrap()
        ))
        .await;
    assert_eq!(response.status(), 204);

    let response = app.get("/api/v1/transactions").await;
    let transactions: serde_json::Value = response.json().await.unwrap();
    assert_eq!(transactions.as_array().unwrap().len(), 1);

    // A description is required.
    let response = app
        .post_json(
            "/api/v1/transactions",
            &json!({ "type": "income", "amount": "10.00", "description": "" }),
        )
        .await;
    assert_eq!(response.status(), 422);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
async fn store_settings_upsert_replaces_the_single_profile() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app.get("/api/v1/settings").await;
    assert_eq!(response.status(), 404);

    let response = app
        .put_json(
            "/api/v1/settings",
            &json!({
                "company_name": "Loja da Maria",
                "cnpj": "12.345.678/0001-90",
                "phone": "(11) 99999-0000"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let settings: serde_json::Value = response.json().await.unwrap();
    assert_eq!(settings["company_name"], "Loja da Maria");
    let first_id = settings["id"].as_str().unwrap().to_string();

    // Saving again replaces the profile instead of adding a second row.
    let response = app
        .put_json(
            "/api/v1/settings",
            &json!({ "company_name": "Loja da Maria LTDA" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["company_name"], "Loja da Maria LTDA");
    assert_eq!(updated["id"].as_str().unwrap(), first_id);
    assert!(updated["cnpj"].is_null());

    let response = app
        .put_json("/api/v1/settings", &json!({ "company_name": "" }))
        .await;
    assert_eq!(response.status(), 422);

    app.cleanup().await;
}
