//! Common types shared by the Authorizer admin client crates

mod error;
pub mod logging;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
