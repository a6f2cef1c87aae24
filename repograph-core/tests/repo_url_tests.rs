// Tests for repository URL parsing

use repograph_core::repo_url::{parse_repository_url, repository_web_url};
use repograph_core::RepositoryReference;

// ============================================================================
// Accepted Addresses
// ============================================================================

#[test]
fn test_parse_octocat_hello_world() {
    let repo = parse_repository_url("https://github.com/octocat/Hello-World").unwrap();
    assert_eq!(repo.owner, "octocat");
    assert_eq!(repo.name, "Hello-World");
}

#[test]
fn test_parse_underscores_and_digits() {
    let repo = parse_repository_url("https://github.com/user_42/my_repo-2").unwrap();
    assert_eq!(repo, RepositoryReference::new("user_42", "my_repo-2"));
}

#[test]
fn test_parse_ignores_trailing_path() {
    let repo = parse_repository_url("https://github.com/rust-lang/rust/tree/master/src").unwrap();
    assert_eq!(repo, RepositoryReference::new("rust-lang", "rust"));
}

#[test]
fn test_parse_stops_at_git_suffix() {
    let repo = parse_repository_url("https://github.com/rust-lang/cargo.git").unwrap();
    assert_eq!(repo.name, "cargo");
}

#[test]
fn test_parse_finds_url_inside_text() {
    let repo = parse_repository_url("see https://github.com/octocat/Spoon-Knife please").unwrap();
    assert_eq!(repo, RepositoryReference::new("octocat", "Spoon-Knife"));
}

// ============================================================================
// Rejected Addresses
// ============================================================================

#[test]
fn test_reject_empty() {
    assert!(parse_repository_url("").is_none());
}

#[test]
fn test_reject_owner_only() {
    assert!(parse_repository_url("https://github.com/octocat").is_none());
    assert!(parse_repository_url("https://github.com/octocat/").is_none());
}

#[test]
fn test_reject_other_hosts() {
    assert!(parse_repository_url("https://gitlab.com/octocat/Hello-World").is_none());
    assert!(parse_repository_url("https://bitbucket.org/octocat/Hello-World").is_none());
}

#[test]
fn test_reject_plain_http_and_missing_scheme() {
    assert!(parse_repository_url("http://github.com/octocat/Hello-World").is_none());
    assert!(parse_repository_url("github.com/octocat/Hello-World").is_none());
}

#[test]
fn test_reject_non_ascii_owner() {
    assert!(parse_repository_url("https://github.com/ñandú/repo").is_none());
}

#[test]
fn test_web_url_round_trip() {
    let repo = RepositoryReference::new("octocat", "Hello-World");
    assert_eq!(repository_web_url(&repo), "https://github.com/octocat/Hello-World");
}
