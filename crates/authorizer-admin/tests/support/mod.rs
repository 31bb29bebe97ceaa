//! In-process fake of the Authorizer GraphQL server.
//!
//! Answers every catalog operation with canned data. Behaviour switches:
//! - request header `x-mock-mode: error` answers with a GraphQL error
//! - `_admin_signup` succeeds once, then errors
//! - with `require_session`, `_admin_session` needs the cookie set by
//!   `_admin_login`

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const SESSION_COOKIE: &str = "authorizer-admin";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub admin_secret: Mutex<Option<String>>,
    pub webhooks: Mutex<Vec<Value>>,
    pub requests: Mutex<Vec<Recorded>>,
    pub require_session: bool,
}

impl MockState {
    pub fn last_request(&self) -> Recorded {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

pub struct MockServer {
    pub url: String,
    pub state: Arc<MockState>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Start a fake server on an ephemeral port.
pub async fn start_mock_server(state: MockState) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let state = Arc::new(state);

    let app = axum::Router::new()
        .route("/graphql", post(graphql))
        .route("/oauth/token", post(token))
        .with_state(Arc::clone(&state));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        url,
        state,
        _handle: handle,
    }
}

/// URL of a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn seeded_webhook() -> Value {
    json!({
        "id": "wh-1",
        "event_name": "user.login",
        "event_description": "login webhook",
        "endpoint": "https://hooks.example.com/login",
        "enabled": true,
        "headers": {"x-hook": "1"},
        "created_at": 1700000000,
        "updated_at": 1700000000
    })
}

fn record(state: &MockState, path: &str, headers: &HeaderMap, body: &Value) {
    let headers = headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    state.requests.lock().unwrap().push(Recorded {
        path: path.to_string(),
        headers,
        body: body.clone(),
    });
}

fn graphql_error(message: &str, field: &str) -> Response {
    Json(json!({
        "errors": [{
            "message": message,
            "locations": [{"line": 1, "column": 3}],
            "path": [field]
        }],
        "data": null
    }))
    .into_response()
}

/// Top-level field of the document: the first name after the first `{`.
fn field_of(query: &str) -> String {
    let after = query.split_once('{').map(|(_, rest)| rest).unwrap_or("");
    after
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn user() -> Value {
    json!({
        "id": "u-1",
        "email": "ada@example.com",
        "email_verified": true,
        "given_name": "Ada",
        "signup_methods": "basic_auth",
        "roles": ["user"],
        "created_at": 1700000000,
        "updated_at": 1700000000,
        "app_data": {}
    })
}

fn page_of(variables: &Value, total: usize) -> Value {
    let pagination = &variables["data"]["pagination"];
    let page = pagination["page"].as_u64().unwrap_or(1);
    let limit = pagination["limit"].as_u64().unwrap_or(10);
    json!({"offset": page.saturating_sub(1) * limit, "total": total, "page": page, "limit": limit})
}

fn message(text: &str) -> Value {
    json!({ "message": text })
}

async fn graphql(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    record(&state, "/graphql", &headers, &body);

    let query = body["query"].as_str().unwrap_or("");
    let variables = &body["variables"];
    let field = field_of(query);

    if headers.get("x-mock-mode").and_then(|v| v.to_str().ok()) == Some("error") {
        return graphql_error("mock failure", &field);
    }

    let data = match field.as_str() {
        "_user" | "_update_user" => user(),
        "_users" => json!({"pagination": page_of(variables, 1), "users": [user()]}),
        "_verification_requests" => json!({
            "pagination": page_of(variables, 1),
            "verification_requests": [{
                "id": "vr-1",
                "token": "tok",
                "email": "ada@example.com",
                "expires": 1700003600,
                "identifier": "basic_auth_signup"
            }]
        }),
        "_admin_session" => {
            let cookie = headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            if state.require_session && !cookie.contains(SESSION_COOKIE) {
                return graphql_error("unauthorized", &field);
            }
            message("admin session refreshed")
        }
        "_admin_signup" => {
            let mut secret = state.admin_secret.lock().unwrap();
            if secret.is_some() {
                return graphql_error("admin sign up already completed", &field);
            }
            *secret = variables["data"]["admin_secret"].as_str().map(String::from);
            message("admin signed up successfully")
        }
        "_admin_login" => {
            let data = json!({ "_admin_login": message("admin logged in successfully") });
            let cookie = format!("{SESSION_COOKIE}=session-token; Path=/; HttpOnly");
            return ([(header::SET_COOKIE, cookie)], Json(json!({ "data": data }))).into_response();
        }
        "_env" => {
            let mut env = serde_json::Map::new();
            let selection = query
                .rsplit_once("_env {")
                .map(|(_, rest)| rest)
                .unwrap_or("");
            for name in selection.split_whitespace().take_while(|t| *t != "}") {
                env.insert(name.to_string(), json!("value"));
            }
            Value::Object(env)
        }
        "_webhook" => seeded_webhook(),
        "_webhooks" => {
            let webhooks = state.webhooks.lock().unwrap().clone();
            json!({"pagination": page_of(variables, webhooks.len()), "webhooks": webhooks})
        }
        "_webhook_logs" => json!({
            "pagination": page_of(variables, 1),
            "webhook_logs": [{
                "id": "log-1",
                "http_status": 200,
                "request": "{}",
                "response": "ok",
                "webhook_id": "wh-1",
                "created_at": 1700000000,
                "updated_at": 1700000000
            }]
        }),
        "_email_templates" => json!({
            "pagination": page_of(variables, 1),
            "email_templates": [{
                "id": "et-1",
                "event_name": "basic_auth_signup",
                "template": "<p>Hello</p>",
                "design": "{}",
                "subject": "Welcome",
                "created_at": 1700000000,
                "updated_at": 1700000000
            }]
        }),
        "_generate_jwt_keys" => {
            let key_type = variables["data"]["type"].as_str().unwrap_or("");
            if key_type.starts_with("HS") {
                json!({"secret": "generated-secret", "public_key": null, "private_key": null})
            } else {
                json!({"secret": null, "public_key": "PUBLIC", "private_key": "PRIVATE"})
            }
        }
        "_test_endpoint" => json!({"http_status": 200, "response": "{\"ok\":true}"}),
        "_admin_logout" | "_update_env" | "_delete_user" | "_invite_members"
        | "_revoke_access" | "_enable_access" | "_add_webhook" | "_update_webhook"
        | "_delete_webhook" | "_add_email_template" | "_update_email_template"
        | "_delete_email_template" => message(&format!("{field} done")),
        other => return graphql_error(&format!("unknown field {other}"), other),
    };

    Json(json!({ "data": { field: data } })).into_response()
}

async fn token(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    record(&state, "/oauth/token", &headers, &body);

    let error_mode = headers.get("x-mock-mode").and_then(|v| v.to_str().ok()) == Some("error");
    if error_mode || body["code"] != "good-code" {
        return Json(json!({
            "error": "invalid_grant",
            "error_description": "authorization code is invalid or expired"
        }))
        .into_response();
    }
    Json(json!({
        "access_token": "access",
        "id_token": "id",
        "refresh_token": null,
        "expires_in": 1800
    }))
    .into_response()
}
