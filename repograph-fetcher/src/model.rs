use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An (owner, name) pair identifying a repository on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author_name: Option<String>,
    pub authored_at: Option<DateTime<Utc>>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author_name: None,
            authored_at: None,
        }
    }

    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }
}

/// A branch together with its most recent commits, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCommits {
    pub name: String,
    pub commits: Vec<Commit>,
}

impl BranchCommits {
    pub fn new(name: impl Into<String>, commits: Vec<Commit>) -> Self {
        Self {
            name: name.into(),
            commits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub repository: RepositoryReference,
    pub branches: Vec<BranchCommits>,
}

impl RepositorySnapshot {
    pub fn commit_count(&self) -> usize {
        self.branches.iter().map(|b| b.commits.len()).sum()
    }
}

// Wire shapes of the commits endpoint. Only the fields we display are kept.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
    #[serde(default)]
    pub sha: String,
    pub commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommitDetail {
    #[serde(default)]
    pub message: String,
    pub author: Option<ApiCommitAuthor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommitAuthor {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl From<ApiCommit> for Commit {
    fn from(api: ApiCommit) -> Self {
        let (author_name, authored_at) = match api.commit.author {
            Some(author) => (author.name, author.date),
            None => (None, None),
        };

        Self {
            sha: api.sha,
            message: api.commit.message,
            author_name,
            authored_at,
        }
    }
}
