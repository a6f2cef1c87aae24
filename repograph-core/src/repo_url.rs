use regex::Regex;
use repograph_fetcher::RepositoryReference;
use std::sync::LazyLock;

/// Message shown when a submitted address is not a repository URL
pub const INVALID_URL_MESSAGE: &str = "Invalid GitHub repository URL.";

// Searched for anywhere in the input, not anchored. Owner and name are ASCII
// word characters and hyphens; anything after the name (a dot, a trailing
// path, a query string) simply ends the match.
static REPOSITORY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)").expect("repository URL pattern is valid")
});

/// Extract the owner and repository name from a GitHub web address.
///
/// Returns `None` when the input does not contain
/// `https://github.com/<owner>/<repo>`; callers treat that as a validation
/// failure. No normalization is attempted: other hosts, `http://` and
/// missing schemes are all rejected.
pub fn parse_repository_url(input: &str) -> Option<RepositoryReference> {
    let captures = REPOSITORY_URL.captures(input)?;
    let owner = captures.get(1)?.as_str();
    let name = captures.get(2)?.as_str();
    Some(RepositoryReference::new(owner, name))
}

/// Canonical web address for a repository reference
pub fn repository_web_url(repo: &RepositoryReference) -> String {
    format!("https://github.com/{}/{}", repo.owner, repo.name)
}
