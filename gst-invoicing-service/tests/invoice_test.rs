//! Invoice integration tests against a live MongoDB.

mod common;

use common::{company_body, invoice_body, TestApp};
use serde_json::{json, Value};

async fn with_company() -> TestApp {
    let app = TestApp::spawn().await;
    let response = app
        .post("/api/company")
        .json(&company_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    app
}

async fn create_invoice(app: &TestApp, body: &Value) -> Value {
    let response = app.post("/api/invoices").json(body).send().await.unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["invoice"].clone()
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn create_requires_company() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/invoices")
        .json(&invoice_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Company not found. Please setup your company details first."
    );

    let response = app.get("/api/invoices/generate-number").send().await.unwrap();
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn create_computes_totals_and_numbers() {
    let app = with_company().await;
    let year = chrono::Utc::now().format("%Y").to_string();

    let invoice = create_invoice(&app, &invoice_body()).await;
    assert_eq!(invoice["invoiceNumber"], format!("INV-{year}-0001"));
    assert_eq!(invoice["subtotal"], "1325.75");
    assert_eq!(invoice["cgstTotal"], "96.27");
    assert_eq!(invoice["sgstTotal"], "96.27");
    assert_eq!(invoice["grandTotal"], "1518.00");
    assert_eq!(invoice["roundOff"], "-0.29");
    assert_eq!(invoice["status"], "generated");
    assert_eq!(invoice["company"]["name"], "Acme Traders");
    assert_eq!(
        invoice["customer"]["shippingAddress"]["city"],
        invoice["customer"]["billingAddress"]["city"]
    );

    let second = create_invoice(&app, &invoice_body()).await;
    assert_eq!(second["invoiceNumber"], format!("INV-{year}-0002"));

    let body: Value = app
        .get("/api/invoices/generate-number")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["invoiceNumber"], format!("INV-{year}-0003"));

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn list_filters_and_paginates() {
    let app = with_company().await;

    for name in ["Globex", "Initech", "Globex Retail"] {
        let mut body = invoice_body();
        body["customer"]["name"] = json!(name);
        create_invoice(&app, &body).await;
    }

    let body: Value = app
        .get("/api/invoices?customerName=globex&limit=1&sortBy=invoiceNumber&sortOrder=asc")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["invoices"].as_array().unwrap().len(), 1);
    assert_eq!(body["invoices"][0]["customer"]["name"], "Globex");
    assert_eq!(body["invoices"][0]["company"]["name"], "Acme Traders");
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["pages"], 2);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn update_status_and_delete() {
    let app = with_company().await;
    let invoice = create_invoice(&app, &invoice_body()).await;
    let id = invoice["id"].as_str().unwrap().to_string();

    let response = app
        .put(&format!("/api/invoices/{id}"))
        .json(&json!({
            "products": [{ "description": "Retainer", "quantity": 2, "price": 500, "gstRate": 12 }],
            "dueDate": "2024-01-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["invoice"]["subtotal"], "1000.00");
    assert_eq!(body["invoice"]["grandTotal"], "1120.00");
    assert_eq!(body["invoice"]["dueDate"], "2024-03-31");
    assert_eq!(body["invoice"]["invoiceNumber"], invoice["invoiceNumber"]);

    let response = app
        .patch(&format!("/api/invoices/{id}/status"))
        .json(&json!({ "status": "paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invoice status updated to paid");
    assert_eq!(body["invoice"]["status"], "paid");
    assert!(body["invoice"]["paidAt"].is_string());
    assert_eq!(body["invoice"]["isOverdue"], false);

    let stats: Value = app
        .get("/api/invoices/dashboard-stats")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["paid"], 1);
    assert_eq!(stats["collectionRate"], "100.0");

    let response = app
        .delete(&format!("/api/invoices/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .get(&format!("/api/invoices/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires running MongoDB
async fn unknown_status_is_rejected() {
    let app = with_company().await;
    let invoice = create_invoice(&app, &invoice_body()).await;
    let id = invoice["id"].as_str().unwrap();

    let response = app
        .patch(&format!("/api/invoices/{id}/status"))
        .json(&json!({ "status": "archived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}
