//! Rate-limited access to the code host's contents API.

mod client;
mod rate_limit;

pub use client::{FileContent, FileEntry, SourceFetcher, SourceProvider};
pub use rate_limit::RateLimiter;
