//! In-process stub of the auth service, bound to an ephemeral localhost port.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use warden::identity::Credential;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";
pub const BROKEN_EMAIL: &str = "broken@example.com";
pub const EMPTY_EMAIL: &str = "empty@example.com";
pub const PASSWORD: &str = "secret";

pub fn token_for(role: &str, email: &str, exp: i64) -> Credential {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(
        json!({"id": "u-1", "profileId": "p-1", "email": email, "role": role, "iat": exp - 3600, "exp": exp}).to_string(),
    );
    Credential::new(format!("{}.{}.c2ln", header, body))
}

pub fn in_an_hour() -> i64 { chrono::Utc::now().timestamp() + 3600 }

#[derive(Default)]
pub struct StubState {
    pub login_hits: AtomicUsize,
    pub logout_hits: AtomicUsize,
    pub issued: Mutex<Option<String>>,
    pub seen_auth: Mutex<Vec<Option<String>>>,
}

pub struct Stub {
    pub base: String,
    pub state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl Drop for Stub {
    fn drop(&mut self) { self.handle.abort(); }
}

fn auth_header(headers: &HeaderMap) -> Option<String> {
    headers.get("authorization").and_then(|v| v.to_str().ok()).map(|s| s.to_string())
}

async fn login(State(st): State<Arc<StubState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    st.login_hits.fetch_add(1, Ordering::SeqCst);
    let email = body.get("email").and_then(|v| v.as_str()).unwrap_or("");
    let password = body.get("password").and_then(|v| v.as_str()).unwrap_or("");
    if password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials", "statusCode": 401})),
        );
    }
    let token = match email {
        ADMIN_EMAIL => token_for("ADMIN", email, in_an_hour()).as_str().to_string(),
        USER_EMAIL => token_for("USER", email, in_an_hour()).as_str().to_string(),
        BROKEN_EMAIL => "not-a-jwt".to_string(),
        EMPTY_EMAIL => {
            return (StatusCode::OK, Json(json!({"success": false, "message": "No token", "statusCode": 200, "data": {}})));
        }
        _ => return (StatusCode::NOT_FOUND, Json(json!({"success": false, "statusCode": 404}))),
    };
    *st.issued.lock() = Some(token.clone());
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Logged in", "statusCode": 200, "data": {"accessToken": token}})),
    )
}

async fn stats(State(st): State<Arc<StubState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = auth_header(&headers);
    st.seen_auth.lock().push(auth.clone());
    let Some(auth) = auth else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "missing token"})));
    };
    let issued = st.issued.lock().clone().unwrap_or_default();
    if auth == issued || auth == format!("Bearer {}", issued) {
        (StatusCode::OK, Json(json!({"users": 3})))
    } else {
        (StatusCode::FORBIDDEN, Json(json!({"message": "bad token"})))
    }
}

async fn echo(State(st): State<Arc<StubState>>, headers: HeaderMap) -> Json<Value> {
    let auth = auth_header(&headers);
    st.seen_auth.lock().push(auth.clone());
    let cookie = headers.get("cookie").and_then(|v| v.to_str().ok()).map(|s| s.to_string());
    Json(json!({"authorization": auth, "cookie": cookie}))
}

async fn forbidden(State(st): State<Arc<StubState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    st.seen_auth.lock().push(auth_header(&headers));
    (StatusCode::FORBIDDEN, Json(json!({"message": "admins only"})))
}

async fn crash() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom"})))
}

async fn logout(State(st): State<Arc<StubState>>, headers: HeaderMap) -> StatusCode {
    st.logout_hits.fetch_add(1, Ordering::SeqCst);
    st.seen_auth.lock().push(auth_header(&headers));
    StatusCode::NO_CONTENT
}

pub async fn start_stub() -> Stub {
    let state = Arc::new(StubState::default());
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/logout-broken", post(crash))
        .route("/api/v1/admin/stats", get(stats))
        .route("/api/v1/admin/echo", get(echo).post(echo).delete(echo))
        .route("/api/v1/admin/forbidden", get(forbidden))
        .route("/api/v1/admin/crash", get(crash))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("stub server error: {e:?}");
        }
    });
    Stub { base: format!("http://{}/api/v1", addr), state, handle }
}
