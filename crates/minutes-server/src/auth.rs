use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use rand::RngCore;

/// The authenticated user for a request, inserted into request extensions
/// by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct Owner(pub String);

// ---------------------------------------------------------------------------
// SessionMap
// ---------------------------------------------------------------------------

/// Token → user lookup. Session issuance is an external collaborator; the
/// server consumes tokens seeded from config, plus [`SessionMap::mint`] for
/// local bootstrap.
#[derive(Default)]
pub struct SessionMap {
    inner: RwLock<HashMap<String, String>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            inner: RwLock::new(entries.into_iter().collect()),
        }
    }

    pub fn insert(&self, token: impl Into<String>, user: impl Into<String>) {
        self.inner
            .write()
            .expect("session map lock poisoned")
            .insert(token.into(), user.into());
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.inner
            .read()
            .expect("session map lock poisoned")
            .get(token)
            .cloned()
    }

    /// Issue a fresh random token bound to `user`.
    pub fn mint(&self, user: impl Into<String>) -> String {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        self.insert(token.clone(), user);
        token
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .expect("session map lock poisoned")
            .is_empty()
    }
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// Axum middleware gating every API route behind a valid session.
///
/// Accepted credentials, in order:
/// 1. `Authorization: Bearer <token>` header
/// 2. `minutes_session=<token>` cookie
///
/// Anything else → 401 with an `UNAUTHORIZED` error code.
pub async fn auth_middleware(
    State(sessions): State<Arc<SessionMap>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req).or_else(|| cookie_token(&req)) {
        if let Some(user) = sessions.resolve(&token) {
            req.extensions_mut().insert(Owner(user));
            return next.run(req).await;
        }
    }

    Response::builder()
        .status(401)
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"error":{"code":"UNAUTHORIZED","message":"missing or invalid session"}}"#,
        ))
        .expect("infallible: all header values are valid ASCII")
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
}

fn cookie_token(req: &Request) -> Option<String> {
    let cookies = req.headers().get("cookie")?.to_str().ok()?;
    for part in cookies.split(';') {
        if let Some(val) = part.trim().strip_prefix("minutes_session=") {
            return Some(val.to_string());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{http::Request, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(Extension(owner): Extension<Owner>) -> String {
        owner.0
    }

    fn test_app(sessions: Arc<SessionMap>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(sessions, auth_middleware))
    }

    #[tokio::test]
    async fn missing_token_is_401_json() {
        let sessions = Arc::new(SessionMap::new());
        let resp = test_app(sessions)
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(ct.contains("application/json"));
    }

    #[tokio::test]
    async fn unknown_token_is_401() {
        let sessions = Arc::new(SessionMap::new());
        let resp = test_app(sessions)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_token_resolves_owner() {
        let sessions = Arc::new(SessionMap::new());
        sessions.insert("tok-alice", "alice");
        let resp = test_app(sessions)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("authorization", "Bearer tok-alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cookie_token_resolves_owner() {
        let sessions = Arc::new(SessionMap::new());
        sessions.insert("tok-alice", "alice");
        let resp = test_app(sessions)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("cookie", "theme=dark; minutes_session=tok-alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn mint_produces_resolvable_token() {
        let sessions = SessionMap::new();
        let token = sessions.mint("alice");
        assert!(token.len() >= 24);
        assert_eq!(sessions.resolve(&token).as_deref(), Some("alice"));
    }
}
