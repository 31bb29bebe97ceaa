//! Admin client for the Authorizer identity service
//!
//! `Authorizer` wraps every administrative GraphQL operation (users,
//! webhooks, email templates, env, JWT keys, admin session) and the
//! browser authorization flow behind one result type:
//!
//! ```text
//! operation method --> catalog document --> GraphqlExecutor --> Transport
//!                                                |
//!                                          OperationResult { data, errors }
//! ```
//!
//! Only construction can fail with `Err` (`common::Error::Config`). Every
//! other failure, remote or local, is returned in `OperationResult::errors`.

pub mod catalog;
pub mod client;
pub mod config;
pub mod graphql;
pub mod metrics;
pub mod result;
pub mod types;

pub use client::{AuthorizeData, Authorizer};
pub use config::{ADMIN_SECRET_HEADER, AUTHORIZER_URL_HEADER, ClientConfig};
pub use graphql::{GRAPHQL_PATH, GraphqlExecutor, HeaderOverrides};
pub use result::{ErrorLocation, ErrorRecord, OperationResult, codes};
pub use types::*;

pub use authorizer_auth::{
    AuthorizeInput, AuthorizeResponse, BrowserEnvironment, HeadlessEnvironment, ResponseMode,
    ResponseType, TokenResponse,
};
