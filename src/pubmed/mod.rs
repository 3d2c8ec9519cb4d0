//! PubMed ESearch client: request building, rate limiting, and typed response decoding.

pub mod client;
mod limiter;
mod parse;
pub mod types;

pub use client::{MAX_RESULTS, PubMedClient, PubMedError, SearchClient};
