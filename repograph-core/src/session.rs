// View state for one visualizer window

use crate::graph::RepoGraph;
use crate::repo_url::{INVALID_URL_MESSAGE, parse_repository_url};
use repograph_fetcher::RepositoryReference;
use tracing::debug;

/// Shown when a fetch fails without a usable reason
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to fetch repository data. Please check the URL.";

/// What the view is currently showing. Exactly one of these at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// The URL form, optionally with an inline validation message
    Idle { validation_error: Option<String> },
    Loading { repository: RepositoryReference },
    Error(String),
    Rendered {
        repository: RepositoryReference,
        graph: RepoGraph,
    },
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::Idle {
            validation_error: None,
        }
    }
}

impl ViewState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ViewState::Idle { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn graph(&self) -> Option<&RepoGraph> {
        match self {
            ViewState::Rendered { graph, .. } => Some(graph),
            _ => None,
        }
    }

    pub fn repository(&self) -> Option<&RepositoryReference> {
        match self {
            ViewState::Loading { repository } | ViewState::Rendered { repository, .. } => Some(repository),
            _ => None,
        }
    }
}

/// An accepted submission. The fetch started for it must report back with
/// the same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub generation: u64,
    pub repository: RepositoryReference,
}

/// Drives [`ViewState`] transitions and guards them with a generation token
/// so that a fetch superseded by a newer submission can never overwrite what
/// is on screen.
#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    state: ViewState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Validate `input` and, if it names a repository, move to `Loading`.
    ///
    /// A rejected submission never starts a fetch. Before anything has been
    /// submitted it keeps the form up with a validation message; afterwards it
    /// replaces the results with the error and invalidates any fetch still
    /// running.
    pub fn submit(&mut self, input: &str) -> Option<Submission> {
        let Some(repository) = parse_repository_url(input) else {
            debug!("Rejected repository URL {:?}", input);
            if self.state.is_idle() {
                self.state = ViewState::Idle {
                    validation_error: Some(INVALID_URL_MESSAGE.to_string()),
                };
            } else {
                self.generation += 1;
                self.state = ViewState::Error(INVALID_URL_MESSAGE.to_string());
            }
            return None;
        };

        self.generation += 1;
        self.state = ViewState::Loading {
            repository: repository.clone(),
        };
        debug!("Submission {} for {}", self.generation, repository);

        Some(Submission {
            generation: self.generation,
            repository,
        })
    }

    /// Apply the outcome of a fetch. Returns `false`, leaving the state
    /// untouched, when the result belongs to a superseded submission.
    pub fn complete(&mut self, generation: u64, result: Result<RepoGraph, String>) -> bool {
        if generation != self.generation {
            debug!(
                "Discarding result of submission {} (current is {})",
                generation, self.generation
            );
            return false;
        }

        let ViewState::Loading { repository } = &self.state else {
            return false;
        };
        let repository = repository.clone();

        self.state = match result {
            Ok(graph) => ViewState::Rendered { repository, graph },
            Err(message) => ViewState::Error(failure_message(&message)),
        };
        true
    }
}

/// The reason itself, or the fallback when there is nothing to show
pub fn failure_message(reason: &str) -> String {
    if reason.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        reason.to_string()
    }
}
