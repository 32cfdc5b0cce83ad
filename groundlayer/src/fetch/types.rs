//! Fetch layer types.

use thiserror::Error;

/// Redirect hops followed for one tile before the fetch is abandoned.
pub const MAX_REDIRECT_HOPS: usize = 5;

/// One HTTP exchange, reported as-is with no redirect handling applied.
///
/// Redirect policy belongs to the caller: a redirect response carries its
/// `Location` target in [`FetchResponse::redirect`] and is otherwise a
/// normal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// `Location` target when the status is a redirect.
    pub redirect: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to obtain a tile over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("too many redirects (last target {url})")]
    TooManyRedirects { url: String },
}
