#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use ags_api::auth::password::hash_password;
use ags_api::auth::{Role, TokenAuthority};
use ags_api::config::AppConfig;
use ags_api::database::models::NewIdentity;
use ags_api::database::{MemoryStore, Store};
use ags_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "s3cret-pass";

/// An in-process server backed by its own `MemoryStore`.
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenAuthority,
    client: reqwest::Client,
}

/// A logged-in caller.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub token: String,
}

pub async fn spawn_app() -> Result<TestApp> {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();

    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn Store> = store.clone();
    let router = app(AppState::new(shared, config));

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move { axum::serve(listener, router).await });

    let test_app = TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        tokens: TokenAuthority::new(SECRET, 24),
        client: reqwest::Client::new(),
    };
    test_app.wait_ready(Duration::from_secs(5)).await?;
    Ok(test_app)
}

impl TestApp {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Send a request and return the status with the parsed JSON body.
    pub async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PATCH, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, Some(token), None).await
    }

    /// Sign up through the public endpoint.
    pub async fn signup(&self, role: &str, tag: &str) -> Result<Session> {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "first_name": "Test",
                    "last_name": tag,
                    "phone": format!("07{:08}", phone_suffix(tag)),
                    "email": format!("{}@example.com", tag),
                    "password": PASSWORD,
                    "role": role,
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed: {} {}", status, body);
        session_from(&body)
    }

    pub async fn user(&self, tag: &str) -> Result<Session> {
        self.signup("user", tag).await
    }

    /// An agent with a completed profile.
    pub async fn agent(&self, tag: &str) -> Result<Session> {
        let session = self.signup("agent", tag).await?;
        let (status, body) = self
            .put(
                "/agent/profile",
                &session.token,
                json!({ "license_number": format!("LIC-{}", tag), "bio": "Test agent" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "profile failed: {} {}", status, body);
        Ok(session)
    }

    /// Admins cannot self-register, so they are written straight to the store.
    pub async fn admin(&self) -> Result<Session> {
        let identity = self
            .store
            .insert_identity(NewIdentity {
                first_name: "System".to_string(),
                last_name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                phone: "0700000000".to_string(),
                password_hash: hash_password(PASSWORD)?,
                role: Role::Admin,
                is_verified: true,
            })
            .await?;
        Ok(Session {
            id: identity.id,
            token: self.tokens.issue(identity.id, Role::Admin)?,
        })
    }

    pub async fn property_type(&self, name: &str) -> Result<i64> {
        Ok(self.store.insert_property_type(name).await?.id)
    }

    /// Create a listing as `agent` and return its id.
    pub async fn listing(&self, agent: &Session, title: &str) -> Result<i64> {
        let type_id = match self.store.find_property_type(1).await? {
            Some(existing) => existing.id,
            None => self.property_type("Apartment").await?,
        };
        let (status, body) = self
            .post(
                "/agent/properties",
                &agent.token,
                json!({
                    "title": title,
                    "price": 8500000,
                    "listing_type": "sale",
                    "property_type_id": type_id,
                    "city": "Nairobi",
                    "neighborhood": "Westlands",
                    "images": [{ "url": "https://example.com/p.jpg" }],
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "listing failed: {} {}", status, body);
        body["data"]["id"].as_i64().context("listing id")
    }
}

pub fn session_from(body: &Value) -> Result<Session> {
    Ok(Session {
        id: body["data"]["user"]["id"].as_i64().context("user id")?,
        token: body["data"]["access_token"]
            .as_str()
            .context("access_token")?
            .to_string(),
    })
}

fn phone_suffix(tag: &str) -> u64 {
    tag.bytes().fold(7u64, |acc, b| (acc * 31 + b as u64) % 100_000_000)
}
