#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use dress_rental::{
    backend::MemoryBackend, config::AppConfig, dto::auth::Claims, routes::create_app,
    state::AppState,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret-with-enough-bytes";
const BOUNDARY: &str = "----dress-rental-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MemoryBackend>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::local(JWT_SECRET))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let backend = Arc::new(MemoryBackend::new(config.supabase_url.clone()));
        let state = AppState::new(backend.clone(), config.clone());
        Self {
            router: create_app(state),
            backend,
            config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

pub fn user(email: &str) -> TestUser {
    let id = Uuid::new_v4();
    TestUser {
        id,
        email: email.to_string(),
        token: token_for(id, email),
    }
}

pub fn token_for(id: Uuid, email: &str) -> String {
    let claims = Claims {
        sub: id.to_string(),
        aud: "authenticated".into(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        email: Some(email.to_string()),
        role: Some("authenticated".into()),
        user_metadata: json!({ "full_name": "Test Bear" }),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::get(uri), token)
        .body(Body::empty())
        .expect("request builds")
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::delete(uri), token)
        .body(Body::empty())
        .expect("request builds")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

/// A file part: (field name, file name, content type, bytes).
pub type FilePart<'a> = (&'a str, &'a str, &'a str, &'a [u8]);

pub fn multipart_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: &Value,
    files: &[FilePart<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"payload\"\r\n\r\n{payload}\r\n"
        )
        .as_bytes(),
    );
    for (field, file_name, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    with_auth(Request::builder().method(method).uri(uri), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub fn listing_payload(title: &str) -> Value {
    json!({
        "title": title,
        "types": ["Party"],
        "colors": ["Black"],
        "size": "M",
        "price": "20",
        "description": "Worn once",
        "pickup_location": "Sproul Plaza"
    })
}

pub const JPEG: FilePart<'static> = ("images", "gown.jpg", "image/jpeg", b"\xff\xd8\xff\xe0fake");
