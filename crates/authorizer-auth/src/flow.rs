//! Browser authorization state machine
//!
//! `handle_event` is pure: it receives events and returns `(new_state,
//! action)`. `run_authorize` executes the I/O each action implies against a
//! `BrowserEnvironment`.
//!
//! ```text
//! Start -> BuildRequest -> Redirect   -> Resolved
//!                       -> IframeWait -> Resolved | Failed
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::BrowserEnvironment;
use crate::constants::{
    APP_PATH, AUTHORIZE_PATH, BASE_SCOPES, DEFAULT_AUTHORIZE_TIMEOUT_SECS, OFFLINE_ACCESS_SCOPE,
};
use crate::error::{Error, Result};
use crate::pkce::PkceSession;
use crate::response::AuthorizeResponse;
use crate::util::{create_query_params, create_random_string, encode};

/// OAuth `response_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Code,
    Token,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Code => "code",
            ResponseType::Token => "token",
        }
    }
}

/// OAuth `response_mode`. Only `WebMessage` stays on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    #[default]
    WebMessage,
    Query,
    Fragment,
    FormPost,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::WebMessage => "web_message",
            ResponseMode::Query => "query",
            ResponseMode::Fragment => "fragment",
            ResponseMode::FormPost => "form_post",
        }
    }
}

/// Caller input for `authorize()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeInput {
    pub response_type: ResponseType,
    #[serde(default)]
    pub response_mode: Option<ResponseMode>,
    #[serde(default)]
    pub use_refresh_token: bool,
}

impl AuthorizeInput {
    pub fn new(response_type: ResponseType) -> Self {
        Self {
            response_type,
            response_mode: None,
            use_refresh_token: false,
        }
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = Some(mode);
        self
    }

    pub fn with_refresh_token(mut self) -> Self {
        self.use_refresh_token = true;
        self
    }
}

/// Client settings the flow needs.
///
/// Serializes to the public part of the client config, which is what the
/// hosted login app receives as `state` on the interactive fallback.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSettings {
    #[serde(rename = "authorizerURL")]
    pub authorizer_url: String,
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(skip)]
    pub timeout: Duration,
}

impl FlowSettings {
    pub fn new(
        authorizer_url: impl Into<String>,
        redirect_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            authorizer_url: authorizer_url.into(),
            redirect_url: redirect_url.into(),
            client_id: client_id.into(),
            timeout: Duration::from_secs(DEFAULT_AUTHORIZE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Hosted login app URL used when the provider needs an interactive login.
    pub fn fallback_url(&self) -> String {
        let state = serde_json::to_string(self).map(|json| encode(&json)).unwrap_or_default();
        format!(
            "{}{APP_PATH}?{}",
            self.authorizer_url,
            create_query_params([
                ("state", Some(state.as_str())),
                ("redirect_uri", Some(self.redirect_url.as_str())),
            ])
        )
    }
}

/// A built authorization request.
///
/// Owns the PKCE session for the code flow; it travels with the request
/// instead of living on the client.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub url: String,
    pub mode: ResponseMode,
    pub state: String,
    pub nonce: String,
    pub pkce: Option<PkceSession>,
}

impl AuthorizeRequest {
    /// Assemble scopes, fresh `state`/`nonce` and, for the code flow, a PKCE
    /// challenge, then serialize the authorize URL.
    pub fn build(settings: &FlowSettings, input: &AuthorizeInput) -> Self {
        let mut scopes = BASE_SCOPES.to_vec();
        if input.use_refresh_token {
            scopes.push(OFFLINE_ACCESS_SCOPE);
        }
        let scope = scopes.join(" ");

        let mode = input.response_mode.unwrap_or_default();
        let state = encode(&create_random_string());
        let nonce = encode(&create_random_string());
        let pkce = (input.response_type == ResponseType::Code).then(PkceSession::generate);
        let challenge = pkce.as_ref().map(PkceSession::challenge);

        let query = create_query_params([
            ("redirect_uri", Some(settings.redirect_url.as_str())),
            ("response_mode", Some(mode.as_str())),
            ("state", Some(state.as_str())),
            ("nonce", Some(nonce.as_str())),
            ("response_type", Some(input.response_type.as_str())),
            ("scope", Some(scope.as_str())),
            ("client_id", Some(settings.client_id.as_str())),
            ("code_challenge", challenge.as_deref()),
        ]);

        Self {
            url: format!("{}{AUTHORIZE_PATH}?{query}", settings.authorizer_url),
            mode,
            state,
            nonce,
            pkce,
        }
    }
}

/// Flow states.
#[derive(Debug)]
pub enum FlowState {
    Start,
    BuildRequest,
    /// Full-page navigation in progress
    Redirect { url: String },
    /// Hidden frame loaded, waiting for its message
    IframeWait { url: String, expected_state: String },
    /// `None` after a redirect: the real result arrives on page reload
    Resolved(Option<AuthorizeResponse>),
    Failed(Error),
}

/// Events that drive state transitions.
#[derive(Debug)]
pub enum FlowEvent {
    Started { has_window: bool },
    RequestBuilt {
        url: String,
        mode: ResponseMode,
        state: String,
    },
    Navigated,
    Message(serde_json::Value),
    ChannelClosed,
    TimedOut { after: Duration },
}

/// Actions the driver executes after a transition.
#[derive(Debug, PartialEq, Eq)]
pub enum FlowAction {
    BuildRequest,
    Navigate(String),
    WaitForMessage(String),
    /// Navigate to the hosted login app, then stop
    FallbackRedirect,
    Finish,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(state: FlowState, event: FlowEvent) -> (FlowState, FlowAction) {
    match (state, event) {
        // --- Start ---
        (FlowState::Start, FlowEvent::Started { has_window: false }) => (
            FlowState::Failed(Error::BrowserUnavailable),
            FlowAction::Finish,
        ),
        (FlowState::Start, FlowEvent::Started { has_window: true }) => {
            (FlowState::BuildRequest, FlowAction::BuildRequest)
        }

        // --- BuildRequest ---
        (
            FlowState::BuildRequest,
            FlowEvent::RequestBuilt {
                url,
                mode: ResponseMode::WebMessage,
                state,
            },
        ) => (
            FlowState::IframeWait {
                url: url.clone(),
                expected_state: state,
            },
            FlowAction::WaitForMessage(url),
        ),
        (FlowState::BuildRequest, FlowEvent::RequestBuilt { url, .. }) => (
            FlowState::Redirect { url: url.clone() },
            FlowAction::Navigate(url),
        ),

        // --- Redirect ---
        (FlowState::Redirect { .. }, FlowEvent::Navigated) => {
            (FlowState::Resolved(None), FlowAction::Finish)
        }

        // --- IframeWait ---
        (FlowState::IframeWait { expected_state, .. }, FlowEvent::Message(data)) => {
            let response = match AuthorizeResponse::from_message(data) {
                Ok(r) => r,
                Err(e) => return (FlowState::Failed(e), FlowAction::Finish),
            };
            if let Some(err) = response.provider_error() {
                let action = if err.requires_interactive_login() {
                    FlowAction::FallbackRedirect
                } else {
                    FlowAction::Finish
                };
                return (FlowState::Failed(err), action);
            }
            match response.state.as_deref() {
                Some(returned) if returned != expected_state => (
                    FlowState::Failed(Error::MalformedMessage(
                        "state does not match the request".into(),
                    )),
                    FlowAction::Finish,
                ),
                _ => (FlowState::Resolved(Some(response)), FlowAction::Finish),
            }
        }
        (FlowState::IframeWait { .. }, FlowEvent::TimedOut { after }) => (
            FlowState::Failed(Error::Timeout(after.as_secs())),
            FlowAction::Finish,
        ),
        (FlowState::IframeWait { .. }, FlowEvent::ChannelClosed) => (
            FlowState::Failed(Error::Interrupted("message channel closed".into())),
            FlowAction::Finish,
        ),

        // --- Invalid/unhandled transition: stay in current state and stop ---
        (state, _event) => (state, FlowAction::Finish),
    }
}

/// Terminal result of a driven flow.
#[derive(Debug)]
pub enum AuthorizeOutcome {
    /// The page is navigating away; nothing to return yet.
    Redirected,
    /// The hidden frame delivered a response. For the code flow `pkce`
    /// holds the verifier the token exchange must present.
    Completed {
        response: AuthorizeResponse,
        pkce: Option<PkceSession>,
    },
}

/// Drive one authorization attempt to completion.
///
/// The only bound on the iframe wait is `settings.timeout`; there is no
/// cancel primitive. Each call builds its own state, nonce and verifier.
pub async fn run_authorize(
    env: &dyn BrowserEnvironment,
    settings: &FlowSettings,
    input: &AuthorizeInput,
) -> Result<AuthorizeOutcome> {
    let mut state = FlowState::Start;
    let mut event = FlowEvent::Started {
        has_window: env.has_window(),
    };
    let mut pkce = None;

    loop {
        let (next, action) = handle_event(state, event);
        state = next;
        event = match action {
            FlowAction::BuildRequest => {
                let request = AuthorizeRequest::build(settings, input);
                debug!(mode = request.mode.as_str(), "authorize request built");
                pkce = request.pkce;
                FlowEvent::RequestBuilt {
                    url: request.url,
                    mode: request.mode,
                    state: request.state,
                }
            }
            FlowAction::Navigate(url) => {
                info!(from = ?env.current_location(), "redirecting to authorize endpoint");
                env.navigate(&url);
                FlowEvent::Navigated
            }
            FlowAction::WaitForMessage(url) => {
                let frame = env.create_hidden_frame(&url);
                let waited = tokio::time::timeout(
                    settings.timeout,
                    env.next_message(&settings.authorizer_url),
                )
                .await;
                env.remove_frame(frame);
                match waited {
                    Ok(Some(data)) => FlowEvent::Message(data),
                    Ok(None) => FlowEvent::ChannelClosed,
                    Err(_) => FlowEvent::TimedOut {
                        after: settings.timeout,
                    },
                }
            }
            FlowAction::FallbackRedirect => {
                warn!("interactive login required, redirecting to hosted login");
                env.navigate(&settings.fallback_url());
                break;
            }
            FlowAction::Finish => break,
        };
    }

    match state {
        FlowState::Resolved(None) => Ok(AuthorizeOutcome::Redirected),
        FlowState::Resolved(Some(response)) => Ok(AuthorizeOutcome::Completed { response, pkce }),
        FlowState::Failed(err) => {
            warn!(error = %err, "authorization failed");
            Err(err)
        }
        other => Err(Error::Interrupted(format!("stopped in {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BoxFuture, FrameId};
    use crate::pkce::compute_challenge;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&str) -> serde_json::Value + Send + Sync>;

    /// Scripted browser: records navigations and frames, answers the frame
    /// with `responder(frame_url)` or never answers if there is none.
    struct MockBrowser {
        window: bool,
        responder: Option<Responder>,
        navigations: Mutex<Vec<String>>,
        frames: Mutex<Vec<String>>,
        removed: Mutex<Vec<FrameId>>,
    }

    impl MockBrowser {
        fn new(window: bool, responder: Option<Responder>) -> Self {
            Self {
                window,
                responder,
                navigations: Mutex::new(vec![]),
                frames: Mutex::new(vec![]),
                removed: Mutex::new(vec![]),
            }
        }

        fn navigations(&self) -> Vec<String> {
            self.navigations.lock().unwrap().clone()
        }

        fn frames(&self) -> Vec<String> {
            self.frames.lock().unwrap().clone()
        }
    }

    impl BrowserEnvironment for MockBrowser {
        fn has_window(&self) -> bool {
            self.window
        }

        fn current_location(&self) -> Option<String> {
            Some("http://localhost:3000/".into())
        }

        fn navigate(&self, url: &str) {
            self.navigations.lock().unwrap().push(url.to_string());
        }

        fn create_hidden_frame(&self, url: &str) -> FrameId {
            let mut frames = self.frames.lock().unwrap();
            frames.push(url.to_string());
            FrameId(frames.len() as u64)
        }

        fn remove_frame(&self, frame: FrameId) {
            self.removed.lock().unwrap().push(frame);
        }

        fn next_message<'a>(
            &'a self,
            _origin: &'a str,
        ) -> BoxFuture<'a, Option<serde_json::Value>> {
            let frame_url = self.frames.lock().unwrap().last().cloned().unwrap_or_default();
            match &self.responder {
                Some(responder) => {
                    let data = responder(&frame_url);
                    Box::pin(async move { Some(data) })
                }
                None => Box::pin(std::future::pending()),
            }
        }
    }

    /// Decoded value of a query parameter.
    fn query_param(url: &str, key: &str) -> Option<String> {
        let query = url.split_once('?')?.1;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).unwrap().into_owned())
        })
    }

    fn settings() -> FlowSettings {
        FlowSettings::new(
            "http://localhost:8080",
            "http://localhost:8080/app",
            "3fab5e58-5693-46f2-8123-83db8133cd22",
        )
    }

    #[test]
    fn build_request_code_flow_includes_challenge() {
        let input = AuthorizeInput::new(ResponseType::Code);
        let request = AuthorizeRequest::build(&settings(), &input);

        assert!(request.url.starts_with("http://localhost:8080/authorize?"));
        assert_eq!(request.mode, ResponseMode::WebMessage);
        assert_eq!(
            query_param(&request.url, "response_mode").as_deref(),
            Some("web_message")
        );
        assert_eq!(
            query_param(&request.url, "scope").as_deref(),
            Some("openid profile email")
        );
        assert_eq!(
            query_param(&request.url, "redirect_uri").as_deref(),
            Some("http://localhost:8080/app")
        );
        assert_eq!(
            query_param(&request.url, "client_id").as_deref(),
            Some("3fab5e58-5693-46f2-8123-83db8133cd22")
        );
        assert_eq!(query_param(&request.url, "state"), Some(request.state.clone()));
        assert_eq!(query_param(&request.url, "nonce"), Some(request.nonce.clone()));

        let pkce = request.pkce.as_ref().expect("code flow must carry PKCE");
        assert_eq!(
            query_param(&request.url, "code_challenge"),
            Some(compute_challenge(pkce.verifier()))
        );
    }

    #[test]
    fn build_request_token_flow_has_no_challenge() {
        let input = AuthorizeInput::new(ResponseType::Token).with_refresh_token();
        let request = AuthorizeRequest::build(&settings(), &input);

        assert!(request.pkce.is_none());
        assert!(query_param(&request.url, "code_challenge").is_none());
        assert_eq!(
            query_param(&request.url, "scope").as_deref(),
            Some("openid profile email offline_access")
        );
        assert_eq!(
            query_param(&request.url, "response_type").as_deref(),
            Some("token")
        );
    }

    #[test]
    fn requests_get_fresh_state_and_nonce() {
        let input = AuthorizeInput::new(ResponseType::Code);
        let a = AuthorizeRequest::build(&settings(), &input);
        let b = AuthorizeRequest::build(&settings(), &input);
        assert_ne!(a.state, b.state);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.pkce, b.pkce);
    }

    #[test]
    fn start_without_window_fails() {
        let (state, action) = handle_event(FlowState::Start, FlowEvent::Started { has_window: false });
        assert!(matches!(state, FlowState::Failed(Error::BrowserUnavailable)));
        assert_eq!(action, FlowAction::Finish);
    }

    #[test]
    fn non_web_message_mode_redirects() {
        let (state, action) = handle_event(
            FlowState::BuildRequest,
            FlowEvent::RequestBuilt {
                url: "http://a/authorize".into(),
                mode: ResponseMode::Query,
                state: "s".into(),
            },
        );
        assert!(matches!(state, FlowState::Redirect { .. }));
        assert_eq!(action, FlowAction::Navigate("http://a/authorize".into()));
    }

    #[test]
    fn mismatched_state_fails() {
        let (state, action) = handle_event(
            FlowState::IframeWait {
                url: "http://a/authorize".into(),
                expected_state: "sent".into(),
            },
            FlowEvent::Message(serde_json::json!({"response": {"code": "c", "state": "other"}})),
        );
        assert!(matches!(state, FlowState::Failed(Error::MalformedMessage(_))));
        assert_eq!(action, FlowAction::Finish);
    }

    #[test]
    fn unexpected_event_stays_put() {
        let (state, action) = handle_event(FlowState::Start, FlowEvent::Navigated);
        assert!(matches!(state, FlowState::Start));
        assert_eq!(action, FlowAction::Finish);
    }

    #[test]
    fn fallback_url_carries_public_config() {
        let url = settings().fallback_url();
        assert!(url.starts_with("http://localhost:8080/app?state="));
        assert_eq!(
            query_param(&url, "redirect_uri").as_deref(),
            Some("http://localhost:8080/app")
        );

        use base64::Engine;
        let state = query_param(&url, "state").unwrap();
        let json = base64::engine::general_purpose::STANDARD
            .decode(state)
            .unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded["authorizerURL"], "http://localhost:8080");
        assert_eq!(decoded["clientID"], "3fab5e58-5693-46f2-8123-83db8133cd22");
        assert_eq!(decoded.as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn no_window_performs_no_navigation() {
        let env = MockBrowser::new(false, None);
        let err = run_authorize(&env, &settings(), &AuthorizeInput::new(ResponseType::Code))
            .await
            .unwrap_err();
        assert_eq!(err, Error::BrowserUnavailable);
        assert!(env.navigations().is_empty());
        assert!(env.frames().is_empty());
    }

    #[tokio::test]
    async fn redirect_mode_navigates_and_returns_immediately() {
        let env = MockBrowser::new(true, None);
        let input = AuthorizeInput::new(ResponseType::Token).with_response_mode(ResponseMode::Query);
        let outcome = run_authorize(&env, &settings(), &input).await.unwrap();

        assert!(matches!(outcome, AuthorizeOutcome::Redirected));
        let navigations = env.navigations();
        assert_eq!(navigations.len(), 1);
        assert!(navigations[0].starts_with("http://localhost:8080/authorize?"));
        assert!(env.frames().is_empty());
    }

    #[tokio::test]
    async fn iframe_code_flow_returns_code_and_matching_verifier() {
        let responder: Responder = Box::new(|frame_url| {
            serde_json::json!({
                "type": "authorization_response",
                "response": {
                    "code": "auth-code",
                    "state": query_param(frame_url, "state"),
                    // echoed so the test can compare against the verifier
                    "code_challenge": query_param(frame_url, "code_challenge"),
                }
            })
        });
        let env = MockBrowser::new(true, Some(responder));

        let outcome = run_authorize(&env, &settings(), &AuthorizeInput::new(ResponseType::Code))
            .await
            .unwrap();

        match outcome {
            AuthorizeOutcome::Completed { response, pkce } => {
                assert_eq!(response.code.as_deref(), Some("auth-code"));
                let pkce = pkce.expect("code flow keeps the verifier");
                assert_eq!(
                    response.extra["code_challenge"],
                    compute_challenge(pkce.verifier())
                );
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(env.navigations().is_empty());
        assert_eq!(env.removed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn iframe_timeout_fails_without_navigation() {
        let env = MockBrowser::new(true, None);
        let settings = settings().with_timeout(Duration::from_secs(5));

        let err = run_authorize(&env, &settings, &AuthorizeInput::new(ResponseType::Token))
            .await
            .unwrap_err();

        assert_eq!(err, Error::Timeout(5));
        assert!(env.navigations().is_empty());
        assert_eq!(env.frames().len(), 1);
        assert_eq!(env.removed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_required_falls_back_to_hosted_login() {
        let responder: Responder = Box::new(|_| {
            serde_json::json!({"response": {"error": "login_required", "error_description": "no session"}})
        });
        let env = MockBrowser::new(true, Some(responder));

        let err = run_authorize(&env, &settings(), &AuthorizeInput::new(ResponseType::Code))
            .await
            .unwrap_err();

        assert!(err.requires_interactive_login());
        let navigations = env.navigations();
        assert_eq!(navigations.len(), 1);
        assert!(navigations[0].starts_with("http://localhost:8080/app?state="));
    }

    #[tokio::test]
    async fn other_provider_errors_do_not_redirect() {
        let responder: Responder = Box::new(|_| {
            serde_json::json!({"response": {"error": "invalid_client", "error_description": "unknown client"}})
        });
        let env = MockBrowser::new(true, Some(responder));

        let err = run_authorize(&env, &settings(), &AuthorizeInput::new(ResponseType::Token))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(env.navigations().is_empty());
    }
}
