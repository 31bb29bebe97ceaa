//! The `Authorizer` admin client
//!
//! Construction is the only fallible step that returns `Err`. Every
//! operation resolves to an `OperationResult`.

use std::sync::Arc;

use authorizer_auth::{
    AuthorizeInput, AuthorizeOutcome, AuthorizeResponse, BrowserEnvironment, HeadlessEnvironment,
    TokenRequest, TokenResponse, run_authorize,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use transport::{ReqwestTransport, Transport};

use crate::catalog::{self, ENV_FIELD, Operation};
use crate::config::ClientConfig;
use crate::graphql::{GraphqlExecutor, HeaderOverrides, extract_field};
use crate::result::{OperationResult, codes};
use crate::types::*;

/// Metrics/log label of raw documents.
const CUSTOM_OPERATION: &str = "graphql_query";

/// What a successful `authorize()` yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorizeData {
    /// Code flow: tokens from the code exchange
    Tokens(TokenResponse),
    /// Token flow: the frame's response as delivered
    Response(AuthorizeResponse),
}

/// Admin client for one Authorizer instance.
#[derive(Clone)]
pub struct Authorizer {
    config: Arc<ClientConfig>,
    executor: GraphqlExecutor,
    browser: Arc<dyn BrowserEnvironment>,
}

impl Authorizer {
    /// Validate `config` and build the default transport.
    pub fn new(config: ClientConfig) -> common::Result<Self> {
        let transport = ReqwestTransport::new()
            .map_err(|e| common::Error::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Validate `config` and use the given transport.
    pub fn with_transport(
        mut config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> common::Result<Self> {
        config.validate()?;
        info!(
            authorizer_url = %config.authorizer_url,
            transport = transport.id(),
            admin_secret = config.admin_secret.is_some(),
            "authorizer client initialized"
        );
        let config = Arc::new(config);
        Ok(Self {
            executor: GraphqlExecutor::new(Arc::clone(&config), transport),
            config,
            browser: Arc::new(HeadlessEnvironment),
        })
    }

    /// Page environment for `authorize()`. Defaults to `HeadlessEnvironment`.
    pub fn with_browser(mut self, browser: Arc<dyn BrowserEnvironment>) -> Self {
        self.browser = browser;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn call<I, T>(&self, op: &Operation, input: &I) -> OperationResult<T>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = match serde_json::to_value(input) {
            Ok(data) => data,
            Err(e) => {
                return OperationResult::from_error(
                    format!("failed to encode {} input: {e}", op.name),
                    codes::INVALID_INPUT,
                );
            }
        };
        self.dispatch(op.name, op.document, serde_json::json!({ "data": data }))
            .await
    }

    async fn call_bare<T: DeserializeOwned>(&self, op: &Operation) -> OperationResult<T> {
        self.dispatch(op.name, op.document, Value::Null).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        field: &str,
        document: &str,
        variables: Value,
    ) -> OperationResult<T> {
        let raw = self
            .executor
            .execute(field, document, variables, &HeaderOverrides::new())
            .await;
        extract_field(raw, field)
    }

    // --- Users ---

    pub async fn user(&self, input: &GetUserRequest) -> OperationResult<User> {
        self.call(&catalog::USER, input).await
    }

    pub async fn users(&self, input: &PaginatedInput) -> OperationResult<Users> {
        self.call(&catalog::USERS, input).await
    }

    pub async fn update_user(&self, input: &UpdateUserInput) -> OperationResult<User> {
        self.call(&catalog::UPDATE_USER, input).await
    }

    pub async fn delete_user(&self, input: &DeleteUserInput) -> OperationResult<GenericResponse> {
        self.call(&catalog::DELETE_USER, input).await
    }

    pub async fn invite_members(
        &self,
        input: &InviteMemberInput,
    ) -> OperationResult<GenericResponse> {
        self.call(&catalog::INVITE_MEMBERS, input).await
    }

    pub async fn revoke_access(
        &self,
        input: &UpdateAccessInput,
    ) -> OperationResult<GenericResponse> {
        self.call(&catalog::REVOKE_ACCESS, input).await
    }

    pub async fn enable_access(
        &self,
        input: &UpdateAccessInput,
    ) -> OperationResult<GenericResponse> {
        self.call(&catalog::ENABLE_ACCESS, input).await
    }

    pub async fn verification_requests(
        &self,
        input: &PaginatedInput,
    ) -> OperationResult<VerificationRequests> {
        self.call(&catalog::VERIFICATION_REQUESTS, input).await
    }

    // --- Admin session ---

    pub async fn admin_session(&self) -> OperationResult<GenericResponse> {
        self.call_bare(&catalog::ADMIN_SESSION).await
    }

    /// Fails server-side once an admin secret has been set.
    pub async fn admin_signup(&self, input: &AdminSecretInput) -> OperationResult<GenericResponse> {
        self.call(&catalog::ADMIN_SIGNUP, input).await
    }

    pub async fn admin_login(&self, input: &AdminSecretInput) -> OperationResult<GenericResponse> {
        self.call(&catalog::ADMIN_LOGIN, input).await
    }

    pub async fn admin_logout(&self) -> OperationResult<GenericResponse> {
        self.call_bare(&catalog::ADMIN_LOGOUT).await
    }

    // --- Server configuration ---

    /// Read the env variables named in `fields`.
    pub async fn env<S: AsRef<str>>(&self, fields: &[S]) -> OperationResult<EnvMap> {
        match catalog::env_document(fields) {
            Ok(document) => self.dispatch(ENV_FIELD, &document, Value::Null).await,
            Err(message) => OperationResult::from_error(message, codes::INVALID_INPUT),
        }
    }

    /// Absent keys are left unchanged server-side.
    pub async fn update_env(&self, input: &EnvMap) -> OperationResult<GenericResponse> {
        self.call(&catalog::UPDATE_ENV, input).await
    }

    pub async fn generate_jwt_keys(
        &self,
        input: &GenerateJwtKeysInput,
    ) -> OperationResult<JwtKeys> {
        self.call(&catalog::GENERATE_JWT_KEYS, input).await
    }

    // --- Webhooks ---

    pub async fn webhook(&self, input: &IdInput) -> OperationResult<Webhook> {
        self.call(&catalog::WEBHOOK, input).await
    }

    pub async fn webhooks(&self, input: &PaginatedInput) -> OperationResult<Webhooks> {
        self.call(&catalog::WEBHOOKS, input).await
    }

    pub async fn webhook_logs(
        &self,
        input: &ListWebhookLogRequest,
    ) -> OperationResult<WebhookLogs> {
        self.call(&catalog::WEBHOOK_LOGS, input).await
    }

    pub async fn add_webhook(&self, input: &AddWebhookInput) -> OperationResult<GenericResponse> {
        self.call(&catalog::ADD_WEBHOOK, input).await
    }

    pub async fn update_webhook(
        &self,
        input: &UpdateWebhookInput,
    ) -> OperationResult<GenericResponse> {
        self.call(&catalog::UPDATE_WEBHOOK, input).await
    }

    pub async fn delete_webhook(&self, input: &IdInput) -> OperationResult<GenericResponse> {
        self.call(&catalog::DELETE_WEBHOOK, input).await
    }

    /// The server calls `input.endpoint` itself; the result reports what
    /// that endpoint answered.
    pub async fn test_endpoint(
        &self,
        input: &TestEndpointInput,
    ) -> OperationResult<TestEndpointResponse> {
        self.call(&catalog::TEST_ENDPOINT, input).await
    }

    // --- Email templates ---

    pub async fn email_templates(
        &self,
        input: &PaginatedInput,
    ) -> OperationResult<EmailTemplates> {
        self.call(&catalog::EMAIL_TEMPLATES, input).await
    }

    pub async fn add_email_template(
        &self,
        input: &AddEmailTemplateInput,
    ) -> OperationResult<GenericResponse> {
        self.call(&catalog::ADD_EMAIL_TEMPLATE, input).await
    }

    pub async fn update_email_template(
        &self,
        input: &UpdateEmailTemplateInput,
    ) -> OperationResult<GenericResponse> {
        self.call(&catalog::UPDATE_EMAIL_TEMPLATE, input).await
    }

    pub async fn delete_email_template(&self, input: &IdInput) -> OperationResult<GenericResponse> {
        self.call(&catalog::DELETE_EMAIL_TEMPLATE, input).await
    }

    // --- Raw access and browser flow ---

    /// Execute any document. The whole `data` object is returned; `headers`
    /// override every configured header of the same name.
    pub async fn graphql_query(
        &self,
        document: &str,
        variables: Value,
        headers: &HeaderOverrides,
    ) -> OperationResult<Value> {
        self.executor
            .execute(CUSTOM_OPERATION, document, variables, headers)
            .await
    }

    /// Exchange an authorization code for tokens.
    pub async fn get_token(&self, code: &str, code_verifier: &str) -> OperationResult<TokenResponse> {
        let request = TokenRequest::authorization_code(code, code_verifier, &self.config.client_id);
        self.executor.post_token(&request).await
    }

    /// Run the browser authorization flow.
    ///
    /// Redirect modes succeed with no data. In the silent mode the code
    /// flow exchanges the code with the verifier generated for this call;
    /// the token flow returns the frame's response.
    pub async fn authorize(&self, input: &AuthorizeInput) -> OperationResult<AuthorizeData> {
        let settings = self.config.flow_settings();
        match run_authorize(self.browser.as_ref(), &settings, input).await {
            Ok(AuthorizeOutcome::Redirected) => OperationResult::empty(),
            Ok(AuthorizeOutcome::Completed {
                response,
                pkce: Some(pkce),
            }) => {
                let Some(code) = response.code else {
                    return OperationResult::from_error(
                        "authorization response did not include a code",
                        codes::INVALID_RESPONSE,
                    );
                };
                self.get_token(&code, &pkce.into_verifier())
                    .await
                    .map(AuthorizeData::Tokens)
            }
            Ok(AuthorizeOutcome::Completed {
                response,
                pkce: None,
            }) => OperationResult::ok(AuthorizeData::Response(response)),
            Err(err) => {
                let code = err.code();
                OperationResult::from_error(err, code)
            }
        }
    }
}
