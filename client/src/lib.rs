pub use crate::config::{ClientConfig, TransportOptions};
pub use crate::http::{Client, ReqwestTransport, Transport};
pub use crate::params::{encode_batch, ParamValue, Params};
pub use crate::responses::*;

pub mod config;
pub mod http;
pub mod params;
pub mod responses;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Transport error: {0}")]
    Transport(String),
    /// Returned only when the client is configured with `raise_for_error`.
    /// `code` is the `err_code` as sent by the API, which is not always an integer.
    #[error("Error code {code} ({error_type}): {message}")]
    Api {
        code: String,
        error_type: String,
        message: String,
    },
    #[error("Parameter `{0}` conflicts with a reserved or required parameter")]
    ConflictingParam(String),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl ClientError {
    /// The API error code as an integer, if this error was reported by the
    /// remote API and its code is an integer.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            ClientError::Api { code, .. } => code.trim().parse().ok(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
