pub mod client;
pub mod endpoints;
pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod types;

pub use client::GitHubClient;
pub use error::FetchError;
pub use pagination::{Endpoint, PageFetch};
pub use types::{Repository, Team};
