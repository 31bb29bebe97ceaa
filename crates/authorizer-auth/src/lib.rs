//! Browser authorization for the Authorizer identity service
//!
//! Provides the primitives (URL trimming, random strings, PKCE) and the
//! `authorize()` flow: build the authorize URL, then either navigate the
//! page or run a silent round-trip through a hidden frame. The flow talks
//! to the page only through the injected `BrowserEnvironment`.
//!
//! Flow:
//! 1. `flow::AuthorizeRequest::build()` creates state, nonce and (code flow)
//!    a `PkceSession`
//! 2. `flow::run_authorize()` redirects, or waits for the frame's message
//! 3. For the code flow the caller posts `token::TokenRequest` with the
//!    session's verifier; the session is consumed there

pub mod browser;
pub mod constants;
pub mod error;
pub mod flow;
pub mod pkce;
pub mod response;
pub mod token;
pub mod util;

pub use browser::{BrowserEnvironment, FrameId, HeadlessEnvironment};
pub use constants::*;
pub use error::{Error, Result};
pub use flow::{
    AuthorizeInput, AuthorizeOutcome, AuthorizeRequest, FlowSettings, ResponseMode, ResponseType,
    run_authorize,
};
pub use pkce::{PkceSession, compute_challenge, generate_verifier};
pub use response::AuthorizeResponse;
pub use token::{TokenRequest, TokenResponse};
pub use util::{create_query_params, create_random_string, encode, trim_url};
