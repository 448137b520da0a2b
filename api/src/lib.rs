//! This crate contains the shared mapping model and the client for the
//! proxy admin `/configurations` endpoints.

pub mod configuration_providers;
pub mod mapping;
pub mod mapping_table;
pub mod settings;

use thiserror::Error;

pub use configuration_providers::ConfigurationProvider;
pub use mapping::Mapping;
pub use mapping::MappingId;
pub use mapping_table::MappingTable;

/// An error from one of the remote `/configurations` calls.
///
/// Every variant means the remote request failed. Callers are expected to
/// surface it; nothing in this workspace retries.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The base URL can not be used to build request URLs.
    #[error("invalid admin base url '{0}'")]
    InvalidBaseUrl(String),

    /// The request never produced a response (connect, timeout, io).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{method} {url} returned {status}")]
    Status {
        method: reqwest::Method,
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body is not a list of mappings.
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
