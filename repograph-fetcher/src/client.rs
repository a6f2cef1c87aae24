use crate::error::{FetchError, Result};
use crate::model::{ApiCommit, Branch, BranchCommits, Commit, RepositoryReference, RepositorySnapshot};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com/";
pub const DEFAULT_USER_AGENT: &str = "repograph/0.1 (https://github.com/trapdoorsec/repograph)";
pub const DEFAULT_COMMITS_PER_BRANCH: usize = 5;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Events emitted while a repository is being fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    BranchesListed { count: usize },
    CommitsFetched { branch: String, count: usize },
}

pub type ProgressCallback = Arc<dyn Fn(FetchProgress) + Send + Sync>;

/// Read-only client for the two GitHub endpoints we need: branch listing and
/// recent commits per branch.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
    commits_per_branch: usize,
    max_concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl GithubClient {
    pub fn new(api_base: &str) -> Result<Self> {
        Self::with_user_agent(api_base, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(api_base: &str, user_agent: &str) -> Result<Self> {
        let api_base = normalize_base(api_base)?;

        // No overall request timeout: a fetch cycle waits as long as the API does.
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(DEFAULT_MAX_CONCURRENCY)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_base,
            token: None,
            commits_per_branch: DEFAULT_COMMITS_PER_BRANCH,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            progress_callback: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_commits_per_branch(mut self, count: usize) -> Self {
        self.commits_per_branch = count.max(1);
        self
    }

    /// Upper bound on commit requests in flight at once
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// `GET /repos/{owner}/{repo}/branches`
    pub async fn list_branches(&self, repo: &RepositoryReference) -> Result<Vec<Branch>> {
        let url = self.endpoint(repo, "branches")?;
        self.get_json(url, "branches").await
    }

    /// `GET /repos/{owner}/{repo}/commits?sha={branch}&per_page={n}`
    pub async fn list_commits(&self, repo: &RepositoryReference, branch: &str) -> Result<Vec<Commit>> {
        let mut url = self.endpoint(repo, "commits")?;
        url.query_pairs_mut()
            .append_pair("sha", branch)
            .append_pair("per_page", &self.commits_per_branch.to_string());

        let api_commits: Vec<ApiCommit> = self.get_json(url, "commits").await?;

        Ok(api_commits
            .into_iter()
            .take(self.commits_per_branch)
            .map(Commit::from)
            .collect())
    }

    /// Fetch every branch and its recent commits.
    ///
    /// Commit requests run concurrently, at most `max_concurrency` at a time,
    /// and results keep the order the API listed the branches in. The first
    /// failure aborts the whole operation; requests still in flight are
    /// dropped and nothing partial is returned.
    pub async fn fetch_repository(&self, repo: &RepositoryReference) -> Result<RepositorySnapshot> {
        info!("Fetching branches and commits for {}", repo);

        let branches = self.list_branches(repo).await?;
        debug!("{} lists {} branches", repo, branches.len());
        self.report(FetchProgress::BranchesListed {
            count: branches.len(),
        });

        let client = self;
        let branches: Vec<BranchCommits> = stream::iter(branches)
            .map(move |branch| async move {
                let commits = client.list_commits(repo, &branch.name).await?;
                client.report(FetchProgress::CommitsFetched {
                    branch: branch.name.clone(),
                    count: commits.len(),
                });
                Ok::<_, FetchError>(BranchCommits::new(branch.name, commits))
            })
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        let snapshot = RepositorySnapshot {
            repository: repo.clone(),
            branches,
        };
        info!(
            "Fetched {} branches and {} commits for {}",
            snapshot.branches.len(),
            snapshot.commit_count(),
            repo
        );

        Ok(snapshot)
    }

    fn endpoint(&self, repo: &RepositoryReference, resource: &str) -> Result<Url> {
        self.api_base
            .join(&format!("repos/{}/{}/{}", repo.owner, repo.name, resource))
            .map_err(|e| FetchError::InvalidBaseUrl(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(ref token) = self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return Err(FetchError::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            resource: resource.to_string(),
            message: e.to_string(),
        })
    }

    fn report(&self, event: FetchProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

/// Parse the API base and make sure relative joins land under it.
fn normalize_base(api_base: &str) -> Result<Url> {
    let mut base = Url::parse(api_base).map_err(|e| FetchError::InvalidBaseUrl(format!("{}: {}", api_base, e)))?;
    if base.cannot_be_a_base() {
        return Err(FetchError::InvalidBaseUrl(api_base.to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, Request, Respond, ResponseTemplate,
    };

    /// Answers after `delay` and records how many requests overlapped.
    /// A request is in flight from its arrival until its delayed reply goes out.
    struct InFlightRecorder {
        delay: Duration,
        busy_until: Mutex<Vec<Instant>>,
        peak: Arc<AtomicUsize>,
        body: serde_json::Value,
    }

    impl Respond for InFlightRecorder {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            let now = Instant::now();
            let mut busy = self.busy_until.lock().unwrap();
            busy.retain(|until| *until > now);
            busy.push(now + self.delay);
            self.peak.fetch_max(busy.len(), Ordering::SeqCst);

            ResponseTemplate::new(200)
                .set_body_json(self.body.clone())
                .set_delay(self.delay)
        }
    }

    /// An address nothing listens on
    fn closed_address() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    fn octocat() -> RepositoryReference {
        RepositoryReference::new("octocat", "Hello-World")
    }

    fn commit_json(sha: &str, message: &str, author: &str) -> serde_json::Value {
        serde_json::json!({
            "sha": sha,
            "commit": {
                "message": message,
                "author": { "name": author, "date": "2024-01-02T03:04:05Z" }
            }
        })
    }

    async fn mount_branches(server: &MockServer, names: &[&str]) {
        let body: Vec<serde_json::Value> = names
            .iter()
            .map(|n| serde_json::json!({ "name": n, "protected": false }))
            .collect();

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_commits(server: &MockServer, branch: &str, commits: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/commits"))
            .and(query_param("sha", branch))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(commits))
            .mount(server)
            .await;
    }

    #[test]
    fn test_normalize_base_appends_slash() {
        let base = normalize_base("http://localhost:8080/api/v3").unwrap();
        assert_eq!(base.as_str(), "http://localhost:8080/api/v3/");

        let base = normalize_base("https://api.github.com").unwrap();
        assert_eq!(base.as_str(), "https://api.github.com/");
    }

    #[test]
    fn test_normalize_base_rejects_garbage() {
        assert!(matches!(
            normalize_base("not a url"),
            Err(FetchError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            normalize_base("mailto:someone@example.com"),
            Err(FetchError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = GithubClient::new(DEFAULT_API_BASE)
            .unwrap()
            .with_token(Some("   ".to_string()));
        assert!(!client.has_token());
    }

    #[tokio::test]
    async fn test_fetch_repository_collects_commits_per_branch() {
        let server = MockServer::start().await;
        mount_branches(&server, &["main", "feature-x"]).await;
        mount_commits(
            &server,
            "main",
            vec![
                commit_json("a1", "Fix bug", "Mona"),
                commit_json("a2", "Initial commit", "Hubot"),
            ],
        )
        .await;
        mount_commits(&server, "feature-x", vec![commit_json("b1", "Add feature", "Mona")]).await;

        let client = GithubClient::new(&server.uri()).unwrap();
        let snapshot = client.fetch_repository(&octocat()).await.unwrap();

        assert_eq!(snapshot.repository, octocat());
        assert_eq!(snapshot.branches.len(), 2);
        assert_eq!(snapshot.branches[0].name, "main");
        assert_eq!(snapshot.branches[0].commits.len(), 2);
        assert_eq!(snapshot.branches[0].commits[0].message, "Fix bug");
        assert_eq!(snapshot.branches[1].name, "feature-x");
        assert_eq!(snapshot.branches[1].commits[0].author_name.as_deref(), Some("Mona"));
        assert_eq!(snapshot.commit_count(), 3);
    }

    #[tokio::test]
    async fn test_token_is_sent_as_authorization_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/branches"))
            .and(header("authorization", "token s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri())
            .unwrap()
            .with_token(Some("s3cr3t".to_string()));
        let branches = client.list_branches(&octocat()).await.unwrap();

        assert!(branches.is_empty());
    }

    #[tokio::test]
    async fn test_branch_failure_issues_no_commit_requests() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/branches"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri()).unwrap();
        let err = client.fetch_repository(&octocat()).await.unwrap_err();

        match err {
            FetchError::Status { resource, status } => {
                assert_eq!(resource, "branches");
                assert_eq!(status, 404);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_commit_failure_aborts_everything() {
        let server = MockServer::start().await;
        mount_branches(&server, &["main", "broken"]).await;
        mount_commits(&server, "main", vec![commit_json("a1", "ok", "Mona")]).await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/commits"))
            .and(query_param("sha", "broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri()).unwrap();
        let err = client.fetch_repository(&octocat()).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "Failed to fetch commits (HTTP 500)");
    }

    #[tokio::test]
    async fn test_commits_are_capped_per_branch() {
        let server = MockServer::start().await;
        mount_branches(&server, &["main"]).await;

        // A server that ignores per_page must not push us past the cap
        let many: Vec<serde_json::Value> = (0..8)
            .map(|i| commit_json(&format!("c{}", i), &format!("commit {}", i), "Mona"))
            .collect();
        mount_commits(&server, "main", many).await;

        let client = GithubClient::new(&server.uri()).unwrap();
        let snapshot = client.fetch_repository(&octocat()).await.unwrap();

        assert_eq!(snapshot.branches[0].commits.len(), 5);
        assert_eq!(snapshot.branches[0].commits[0].sha, "c0");
        assert_eq!(snapshot.branches[0].commits[4].sha, "c4");
    }

    #[tokio::test]
    async fn test_custom_page_size_is_requested() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/commits"))
            .and(query_param("sha", "main"))
            .and(query_param("per_page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![
                commit_json("a1", "one", "Mona"),
                commit_json("a2", "two", "Mona"),
            ]))
            .expect(1)
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri())
            .unwrap()
            .with_commits_per_branch(2);
        let commits = client.list_commits(&octocat(), "main").await.unwrap();

        assert_eq!(commits.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri()).unwrap();
        let err = client.list_branches(&octocat()).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode { ref resource, .. } if resource == "branches"));
    }

    #[tokio::test]
    async fn test_progress_callback_reports_each_step() {
        let server = MockServer::start().await;
        mount_branches(&server, &["main", "dev"]).await;
        mount_commits(&server, "main", vec![commit_json("a1", "one", "Mona")]).await;
        mount_commits(
            &server,
            "dev",
            vec![commit_json("b1", "two", "Mona"), commit_json("b2", "three", "Mona")],
        )
        .await;

        let events: Arc<Mutex<Vec<FetchProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let client = GithubClient::new(&server.uri())
            .unwrap()
            .with_max_concurrency(1)
            .with_progress_callback(Arc::new(move |event| {
                events_clone.lock().unwrap().push(event);
            }));
        client.fetch_repository(&octocat()).await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], FetchProgress::BranchesListed { count: 2 });
        assert!(events.contains(&FetchProgress::CommitsFetched {
            branch: "main".to_string(),
            count: 1
        }));
        assert!(events.contains(&FetchProgress::CommitsFetched {
            branch: "dev".to_string(),
            count: 2
        }));
    }

    #[tokio::test]
    async fn test_many_branches_with_bounded_concurrency() {
        let server = MockServer::start().await;

        let names: Vec<String> = (0..20).map(|i| format!("branch-{}", i)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        mount_branches(&server, &name_refs).await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/commits"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![commit_json("x", "work", "Mona")])
                    .set_delay(Duration::from_millis(10)),
            )
            .expect(20)
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri())
            .unwrap()
            .with_max_concurrency(3);
        let snapshot = client.fetch_repository(&octocat()).await.unwrap();

        // Order follows the branch listing even though requests overlap
        let fetched: Vec<&str> = snapshot.branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(fetched, name_refs);
        assert_eq!(snapshot.commit_count(), 20);
    }

    #[tokio::test]
    async fn test_commit_requests_never_exceed_concurrency_limit() {
        let server = MockServer::start().await;

        let names: Vec<String> = (0..12).map(|i| format!("branch-{}", i)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        mount_branches(&server, &name_refs).await;

        let peak = Arc::new(AtomicUsize::new(0));
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/commits"))
            .respond_with(InFlightRecorder {
                delay: Duration::from_millis(50),
                busy_until: Mutex::new(Vec::new()),
                peak: peak.clone(),
                body: serde_json::json!([commit_json("x", "work", "Mona")]),
            })
            .expect(12)
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri())
            .unwrap()
            .with_max_concurrency(3);
        let snapshot = client.fetch_repository(&octocat()).await.unwrap();

        assert_eq!(snapshot.branches.len(), 12);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "{} commit requests overlapped", peak);
        assert!(peak > 1, "commit requests never overlapped");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let client = GithubClient::new(&closed_address()).unwrap();

        let err = client.list_branches(&octocat()).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "got {:?}", err);

        let err = client.fetch_repository(&octocat()).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "got {:?}", err);
    }
}
