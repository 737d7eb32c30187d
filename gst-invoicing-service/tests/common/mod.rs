//! Shared setup for gst-invoicing-service integration tests.

#![allow(dead_code)]

use gst_invoicing_service::config::{
    CorsConfig, GstConfig, InvoicingConfig, MongoConfig, RateLimitConfig,
};
use gst_invoicing_service::services::MongoDb;
use gst_invoicing_service::{build_router, AppState, Application};
use rust_decimal_macros::dec;
use service_core::axum::Router;
use service_core::config::Config as CommonConfig;

pub const TEST_USER: &str = "user-test-1";

fn mongo_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

pub fn test_config(database: &str) -> InvoicingConfig {
    InvoicingConfig {
        common: CommonConfig {
            port: 0,
            ..CommonConfig::default()
        },
        mongodb: MongoConfig {
            uri: mongo_uri(),
            database: database.to_string(),
        },
        gst: GstConfig {
            default_rate: dec!(18),
            due_days: 30,
        },
        rate_limit: RateLimitConfig {
            requests: 1000,
            window_seconds: 60,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
    }
}

/// Router over a MongoDB client that never connects. Good for every request that is
/// answered before the handler touches storage.
pub async fn offline_router() -> Router {
    let config = test_config("gst_invoicing_offline");
    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
        .await
        .expect("Failed to create MongoDB client");
    build_router(AppState::new(config, db))
}

/// A running server on a random port backed by a throwaway database.
pub struct TestApp {
    pub address: String,
    pub database: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let database = format!("gst_invoicing_test_{}", uuid::Uuid::new_v4().simple());
        let app = Application::build(test_config(&database))
            .await
            .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(app.run_until_stopped(std::future::pending()));

        Self {
            address,
            database,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).header("X-User-ID", TEST_USER)
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).header("X-User-ID", TEST_USER)
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).header("X-User-ID", TEST_USER)
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).header("X-User-ID", TEST_USER)
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).header("X-User-ID", TEST_USER)
    }

    pub async fn cleanup(&self) {
        let client = mongodb::Client::with_uri_str(mongo_uri())
            .await
            .expect("Failed to connect to MongoDB");
        client
            .database(&self.database)
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }
}

pub fn company_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Acme Traders",
        "gstNumber": "27AAPFU0939F1ZV",
        "address": {
            "street": "12 MG Road",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001"
        },
        "contact": { "email": "billing@acme.in", "phone": "9876543210" }
    })
}

pub fn invoice_body() -> serde_json::Value {
    serde_json::json!({
        "customer": {
            "name": "Globex",
            "billingAddress": {
                "street": "4 Park Street",
                "city": "Kolkata",
                "state": "West Bengal",
                "pincode": "700016"
            }
        },
        "invoiceDate": "2024-03-01",
        "dueDate": "2024-03-31",
        "products": [
            { "description": "Consulting", "quantity": 1, "price": 1000, "gstRate": 18 },
            { "description": "Travel", "quantity": 1, "price": "250.50", "gstRate": 5 },
            { "description": "Books", "quantity": 1, "price": 75.25, "gstRate": 0 }
        ]
    })
}
