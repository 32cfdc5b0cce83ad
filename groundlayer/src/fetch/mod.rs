//! Tile fetching over HTTP.
//!
//! The loader talks to the network through the [`TileFetcher`] trait, which
//! performs exactly one HTTP exchange per call and leaves redirect handling
//! to the caller. [`ReqwestFetcher`] is the production implementation; tests
//! substitute scripted fetchers to drive the loader without a network.

mod client;
mod types;

pub use client::{FetcherConfig, ReqwestFetcher, USER_AGENT};
pub use types::{FetchError, FetchResponse, MAX_REDIRECT_HOPS};

use std::future::Future;

/// Transport used to retrieve tile imagery.
///
/// Implementations must not follow redirects themselves; a redirect status
/// is a successful exchange whose [`FetchResponse::redirect`] carries the
/// target. This keeps hop counting and loop detection in one place, with
/// the caller.
pub trait TileFetcher: Send + Sync {
    /// Performs a single GET against `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}
