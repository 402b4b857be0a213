#![allow(dead_code)]

use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use secrecy::Secret;
use temple_service::config::{DatabaseConfig, StorageBackend, TempleConfig};
use temple_service::middleware::USER_ID_HEADER;
use temple_service::startup::Application;
use uuid::Uuid;

pub const TEST_ADMIN: &str = "test-admin";
pub const TEST_USER: &str = "devotee-42";

/// 2025-01-15T00:00:00Z in nanoseconds.
pub const TEST_DATE_NANOS: i64 = 1_736_899_200_000_000_000;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_balance(0).await
    }

    pub async fn spawn_with_balance(initial_balance: i64) -> Self {
        Self::spawn_with_config(TempleConfig {
            initial_balance,
            admin_principals: vec![TEST_ADMIN.to_string()],
            ..TempleConfig::default()
        })
        .await
    }

    /// Spawn against PostgreSQL in a fresh schema, so every test starts from
    /// an empty ledger. Returns `None` when `TEST_DATABASE_URL` is unset.
    pub async fn spawn_postgres(initial_balance: i64) -> Option<Self> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let schema = format!("temple_test_{}", Uuid::new_v4().simple());
        let admin_pool = sqlx::PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to TEST_DATABASE_URL");
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test schema");
        admin_pool.close().await;

        let separator = if database_url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}options=-c%20search_path%3D{}",
            database_url, separator, schema
        );

        let config = TempleConfig {
            initial_balance,
            admin_principals: vec![TEST_ADMIN.to_string()],
            storage: StorageBackend::Postgres,
            database: Some(DatabaseConfig {
                url: Secret::new(url),
                max_connections: 5,
                min_connections: 1,
            }),
            ..TempleConfig::default()
        };

        Some(Self::spawn_with_config(config).await)
    }

    async fn spawn_with_config(config: TempleConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Request as an anonymous guest.
    pub fn guest(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Request as the bootstrap admin.
    pub fn admin(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.as_principal(TEST_ADMIN, method, path)
    }

    pub fn as_principal(
        &self,
        principal: &str,
        method: reqwest::Method,
        path: &str,
    ) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(USER_ID_HEADER, principal)
    }

    /// Submit a confirmation as a guest and return its id.
    pub async fn submit_payment(&self, donor: &str, amount: i64, txn: &str) -> i64 {
        let response = self
            .guest(reqwest::Method::POST, "/payments")
            .json(&payment_body(donor, amount, txn))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201);

        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_i64().expect("id missing")
    }

    pub async fn approve(&self, id: i64) -> Response {
        self.admin(reqwest::Method::POST, &format!("/payments/{}/approve", id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn balance(&self) -> i64 {
        let body: Value = self
            .admin(reqwest::Method::GET, "/account")
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse JSON");
        body["balance"].as_i64().expect("balance missing")
    }

    pub async fn report(&self) -> (i64, u64) {
        let body: Value = self
            .guest(reqwest::Method::GET, "/reports/donations")
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse JSON");
        (
            body["totalAmount"].as_i64().expect("totalAmount missing"),
            body["totalCollections"].as_u64().expect("totalCollections missing"),
        )
    }
}

pub fn payment_body(donor: &str, amount: i64, txn: &str) -> Value {
    json!({
        "donorName": donor,
        "mobileNumber": "9999999999",
        "amountPaid": amount,
        "paymentMode": "upi",
        "transactionId": txn,
        "date": TEST_DATE_NANOS,
    })
}
