//! Request and response models for the admin operations
//!
//! Input structs skip `None` fields when serialized so the server leaves
//! the corresponding values untouched. Response structs default missing
//! fields, since the server only returns what the document selects.
//! Nullable scalars and lists also read a JSON `null` as their default.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Env variables as returned by `_env` and accepted by `_update_env`.
pub type EnvMap = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_verified: bool,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub signup_methods: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_verified: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub is_multi_factor_auth_enabled: Option<bool>,
    #[serde(default)]
    pub app_data: Option<Map<String, Value>>,
}

/// Select a user by id or email.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl GetUserRequest {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            email: None,
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
        }
    }
}

/// Partial user update; `id` selects the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateUserInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_multi_factor_auth_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_data: Option<Map<String, Value>>,
}

impl UpdateUserInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteUserInput {
    pub email: String,
}

/// `{id}` selector used by get/delete webhook and delete email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdInput {
    pub id: String,
}

impl IdInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Target of revoke/enable access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateAccessInput {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteMemberInput {
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Body of `_admin_signup` / `_admin_login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AdminSecretInput {
    pub admin_secret: String,
}

impl AdminSecretInput {
    pub fn new(admin_secret: impl Into<String>) -> Self {
        Self {
            admin_secret: admin_secret.into(),
        }
    }
}

impl fmt::Debug for AdminSecretInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSecretInput")
            .field("admin_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// `{pagination: {page, limit}}`, the input of every list operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaginatedInput {
    pub pagination: PaginationInput,
}

impl PaginatedInput {
    pub fn page(page: u64) -> Self {
        Self {
            pagination: PaginationInput {
                page: Some(page),
                limit: None,
            },
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.pagination.limit = Some(limit);
        self
    }
}

/// Pagination echoed back by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "null_as_default")]
    pub offset: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Users {
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expires: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequests {
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_requests: Vec<VerificationRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub event_name: String,
    #[serde(default)]
    pub event_description: Option<String>,
    pub endpoint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhooks {
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub webhooks: Vec<Webhook>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookLog {
    pub id: String,
    #[serde(default)]
    pub http_status: Option<i64>,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub webhook_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookLogs {
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub webhook_logs: Vec<WebhookLog>,
}

/// Input of `_webhook_logs`; `webhook_id` narrows to one webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListWebhookLogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddWebhookInput {
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
    pub endpoint: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateWebhookInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
}

/// Ask the server to call `endpoint` with a sample payload for `event_name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestEndpointInput {
    pub endpoint: String,
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEndpointResponse {
    pub http_status: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    pub event_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub template: String,
    #[serde(default)]
    pub design: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplates {
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_templates: Vec<EmailTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddEmailTemplateInput {
    pub event_name: String,
    pub subject: String,
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateEmailTemplateInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
}

/// `{message}` returned by most mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResponse {
    pub message: String,
}

/// JWT signing algorithms the server can generate keys for.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JwtKeyType {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
}

impl JwtKeyType {
    /// HMAC algorithms yield a shared secret, the rest a key pair.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, JwtKeyType::HS256 | JwtKeyType::HS384 | JwtKeyType::HS512)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateJwtKeysInput {
    #[serde(rename = "type")]
    pub key_type: JwtKeyType,
}

/// `secret` for symmetric algorithms, `public_key`/`private_key` otherwise.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtKeys {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("JwtKeys")
            .field("secret", &redact(&self.secret))
            .field("public_key", &self.public_key)
            .field("private_key", &redact(&self.private_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_user_skips_absent_fields() {
        let input = UpdateUserInput {
            given_name: Some("Ada".into()),
            roles: Some(vec!["admin".into()]),
            ..UpdateUserInput::new("u-1")
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"id": "u-1", "given_name": "Ada", "roles": ["admin"]})
        );
    }

    #[test]
    fn paginated_input_shape() {
        assert_eq!(
            serde_json::to_value(PaginatedInput::page(1)).unwrap(),
            json!({"pagination": {"page": 1}})
        );
        assert_eq!(
            serde_json::to_value(PaginatedInput::page(2).with_limit(10)).unwrap(),
            json!({"pagination": {"page": 2, "limit": 10}})
        );
    }

    #[test]
    fn jwt_key_type_serializes_as_algorithm_name() {
        let input = GenerateJwtKeysInput {
            key_type: JwtKeyType::RS256,
        };
        assert_eq!(serde_json::to_value(input).unwrap(), json!({"type": "RS256"}));
        assert!(JwtKeyType::HS512.is_symmetric());
        assert!(!JwtKeyType::ES384.is_symmetric());
    }

    #[test]
    fn user_tolerates_sparse_selection() {
        let user: User = serde_json::from_value(json!({
            "id": "u-1",
            "email": "ada@example.com",
            "roles": ["user"],
            "app_data": {"plan": "pro"}
        }))
        .unwrap();
        assert_eq!(user.roles, vec!["user"]);
        assert!(!user.email_verified);
        assert!(user.given_name.is_none());
        assert_eq!(user.app_data.unwrap()["plan"], "pro");
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let user: User = serde_json::from_value(json!({
            "id": "u-2",
            "email": null,
            "email_verified": null,
            "signup_methods": null,
            "roles": null,
            "phone_number": "+15550100"
        }))
        .unwrap();
        assert_eq!(user.email, "");
        assert_eq!(user.signup_methods, "");
        assert!(user.roles.is_empty());
        assert_eq!(user.phone_number.as_deref(), Some("+15550100"));

        let page: VerificationRequests = serde_json::from_value(json!({
            "pagination": {"offset": 0, "total": 1, "page": 1, "limit": null},
            "verification_requests": [{
                "id": "v-1",
                "token": null,
                "email": null,
                "expires": null,
                "identifier": "basic_auth_signup"
            }]
        }))
        .unwrap();
        assert_eq!(page.pagination.limit, 0);
        assert_eq!(page.verification_requests.len(), 1);
        assert_eq!(page.verification_requests[0].token, "");
        assert_eq!(page.verification_requests[0].expires, 0);

        let response: TestEndpointResponse =
            serde_json::from_value(json!({"http_status": 204, "response": null})).unwrap();
        assert_eq!(response.http_status, 204);
        assert_eq!(response.response, "");

        let empty: Webhooks = serde_json::from_value(json!({
            "pagination": {"offset": 0, "total": 0, "page": 1, "limit": 10},
            "webhooks": null
        }))
        .unwrap();
        assert!(empty.webhooks.is_empty());
    }

    #[test]
    fn webhooks_deserialize_with_pagination() {
        let page: Webhooks = serde_json::from_value(json!({
            "pagination": {"offset": 0, "total": 1, "page": 1, "limit": 10},
            "webhooks": [{
                "id": "w-1",
                "event_name": "user.login",
                "endpoint": "https://example.com/hook",
                "enabled": true,
                "headers": {"x-test": "1"}
            }]
        }))
        .unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.webhooks.len(), 1);
        assert!(page.webhooks[0].enabled);
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let input = AdminSecretInput::new("admin");
        assert!(!format!("{input:?}").contains("\"admin\""));

        let keys = JwtKeys {
            secret: Some("shh".into()),
            ..JwtKeys::default()
        };
        let debug = format!("{keys:?}");
        assert!(!debug.contains("shh"));
        assert!(debug.contains("[REDACTED]"));
    }
}
