//! Umbrella error for callers driving the whole gate.
//!
//! The modules keep their own typed errors so tests and views can match on
//! specific failures; `GateError` exists for callers that thread several
//! services together and just want one `?`-friendly type. No error here is
//! fatal: every failure path is designed to return control to the current
//! view with a message.

use thiserror::Error;

use crate::config::ConfigError;
use crate::leads::LeadError;
use crate::resources::ResourceError;
use crate::store::StoreError;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("lead submission error: {0}")]
    Lead(#[from] LeadError),
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
}
