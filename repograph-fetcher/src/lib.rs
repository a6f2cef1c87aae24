pub mod client;
pub mod error;
pub mod model;

pub use client::{FetchProgress, GithubClient, ProgressCallback};
pub use error::FetchError;
pub use model::{Branch, BranchCommits, Commit, RepositoryReference, RepositorySnapshot};
