use repograph_fetcher::client::{
    DEFAULT_API_BASE, DEFAULT_COMMITS_PER_BRANCH, DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT,
};
use repograph_fetcher::{FetchError, GithubClient, ProgressCallback};
use url::Url;

/// Environment variable the CLI reads an optional API token from
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Branch that becomes the `main` hub unless told otherwise
pub const DEFAULT_HUB_BRANCH: &str = "main";

/// Everything a fetch cycle needs to know about the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizerConfig {
    pub api_base: Url,
    pub token: Option<String>,
    pub commits_per_branch: usize,
    pub max_concurrency: usize,
    pub default_branch: String,
    pub user_agent: String,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            token: None,
            commits_per_branch: DEFAULT_COMMITS_PER_BRANCH,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            default_branch: DEFAULT_HUB_BRANCH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl VisualizerConfig {
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_commits_per_branch(mut self, count: usize) -> Self {
        self.commits_per_branch = count.max(1);
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn build_client(&self) -> Result<GithubClient, FetchError> {
        Ok(GithubClient::with_user_agent(self.api_base.as_str(), &self.user_agent)?
            .with_token(self.token.clone())
            .with_commits_per_branch(self.commits_per_branch)
            .with_max_concurrency(self.max_concurrency))
    }

    pub fn build_client_with_progress(&self, callback: ProgressCallback) -> Result<GithubClient, FetchError> {
        Ok(self.build_client()?.with_progress_callback(callback))
    }
}
