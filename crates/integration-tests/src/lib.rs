//! Integration test harness for the Bionicle shop backend.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! over a [`MemoryStore`] and an in-memory session store, so they need no
//! database or network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bionicle-integration-tests
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::cookie::{Cookie, CookieJar, Key};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore as SessionMemoryStore, SessionStore};

use bionicle_api::config::ApiConfig;
use bionicle_api::db::{DocumentStore, MemoryStore};
use bionicle_api::middleware::{SESSION_COOKIE_NAME, create_session_layer, signing_key};
use bionicle_api::models::{CurrentUser, session_keys};
use bionicle_api::routes;
use bionicle_api::state::AppState;

/// Session secret used by every test app.
const TEST_SESSION_SECRET: &str =
    "Zr4!pW8@kN2#vB6$hT1%yQ9^mC3&jL7*xF5(dS0)gA8-uE4+oI2=wK6_nV1~cR9b";

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// `name=value` of the session cookie, if the response set one.
    pub session_cookie: Option<String>,
    /// JSON body, or `Value::Null` when the body is empty or not JSON.
    pub body: Value,
}

/// An in-process application instance.
pub struct TestApp {
    router: Router,
    key: Key,
    sessions: SessionMemoryStore,
    /// Document store behind the router, for seeding and assertions.
    pub store: MemoryStore,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an application over empty stores.
    ///
    /// # Panics
    ///
    /// Panics if the built-in test secret cannot produce a signing key.
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        Self::with_documents(store.clone(), Arc::new(store))
    }

    /// Build an application whose router reads and writes `documents`.
    ///
    /// `store` is exposed as [`TestApp::store`] for seeding and assertions;
    /// pass the memory store that `documents` wraps.
    ///
    /// # Panics
    ///
    /// Panics if the built-in test secret cannot produce a signing key.
    #[must_use]
    pub fn with_documents(store: MemoryStore, documents: Arc<dyn DocumentStore>) -> Self {
        let config = ApiConfig {
            database_url: None,
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            session_secret: SecretString::from(TEST_SESSION_SECRET),
            secure_cookies: false,
            upload_dir: PathBuf::from("./images"),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
        };
        #[allow(clippy::expect_used)]
        let key = signing_key(&config).expect("test secret is a valid key");

        let sessions = SessionMemoryStore::default();
        let layer = create_session_layer(sessions.clone(), key.clone(), false);
        let router = routes::app(AppState::new(config, documents), layer);

        Self {
            router,
            key,
            sessions,
            store,
        }
    }

    /// Send a request, optionally with a session cookie and a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };

        #[allow(clippy::expect_used)]
        let response = self
            .router
            .clone()
            .oneshot(request.expect("valid request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(str::to_owned);

        #[allow(clippy::expect_used)]
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body is readable")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            session_cookie,
            body,
        }
    }

    /// `GET` without a body.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    /// `POST` with a JSON body.
    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    /// Register `username` and return the session cookie from the response.
    ///
    /// # Panics
    ///
    /// Panics if registration fails or sets no cookie.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/users",
                None,
                serde_json::json!({ "username": username, "password": "kanohi-mask-of-power" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        #[allow(clippy::expect_used)]
        response.session_cookie.expect("registration sets a session cookie")
    }

    /// Plant a session holding `user` directly in the session store and
    /// return a correctly signed cookie for it.
    ///
    /// Lets tests present identities the HTTP surface cannot produce, such as
    /// one issued more than a day ago.
    ///
    /// # Panics
    ///
    /// Panics if the session store rejects the record.
    pub async fn forge_session(&self, user: &CurrentUser) -> String {
        let mut record = Record {
            id: Id::default(),
            data: std::collections::HashMap::new(),
            expiry_date: tower_sessions::cookie::time::OffsetDateTime::now_utc()
                + tower_sessions::cookie::time::Duration::hours(1),
        };
        #[allow(clippy::expect_used)]
        record.data.insert(
            session_keys::CURRENT_USER.to_owned(),
            serde_json::to_value(user).expect("user serializes"),
        );
        #[allow(clippy::expect_used)]
        self.sessions
            .create(&mut record)
            .await
            .expect("memory session store accepts records");

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key)
            .add(Cookie::new(SESSION_COOKIE_NAME, record.id.to_string()));
        #[allow(clippy::expect_used)]
        let signed = jar.get(SESSION_COOKIE_NAME).expect("cookie was added");
        format!("{SESSION_COOKIE_NAME}={}", signed.value())
    }
}

/// Flip the last character of a cookie's value, breaking its signature.
#[must_use]
pub fn tamper(cookie: &str) -> String {
    let mut chars: Vec<char> = cookie.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = if *last == 'A' { 'B' } else { 'A' };
    }
    chars.into_iter().collect()
}

