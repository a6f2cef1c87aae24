use crate::config::VisualizerConfig;
use crate::graph::{RepoGraph, shape_graph};
use crate::repo_url::{INVALID_URL_MESSAGE, parse_repository_url};
use indicatif::{ProgressBar, ProgressStyle};
use repograph_fetcher::{FetchError, FetchProgress, ProgressCallback, RepositoryReference};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum VisualizeError {
    #[error("{0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Options for a one-shot visualization
pub struct VisualizeOptions {
    pub config: VisualizerConfig,
    pub show_progress: bool,
}

/// Callback for human-readable progress lines
pub type VisualizeProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// A rendered repository: what was asked for and the graph that came back
#[derive(Debug, Clone)]
pub struct Visualization {
    pub repository: RepositoryReference,
    pub graph: RepoGraph,
}

/// Render a progress event as a status line
pub fn describe_progress(event: &FetchProgress) -> String {
    match event {
        FetchProgress::BranchesListed { count } => format!("Found {} branches", count),
        FetchProgress::CommitsFetched { branch, count } => {
            format!("Fetched {} commits from {}", count, branch)
        }
    }
}

/// Fetch one repository and shape the result. Shared by the CLI and the
/// interactive view; nothing is kept between calls.
pub async fn fetch_graph(
    config: &VisualizerConfig,
    repository: &RepositoryReference,
    progress: Option<ProgressCallback>,
) -> Result<RepoGraph, FetchError> {
    let client = match progress {
        Some(callback) => config.build_client_with_progress(callback)?,
        None => config.build_client()?,
    };

    let snapshot = client.fetch_repository(repository).await?;
    let graph = shape_graph(&snapshot.branches, &config.default_branch);

    if let Err(e) = graph.validate() {
        warn!("Shaped graph for {} is inconsistent: {}", repository, e);
    }

    Ok(graph)
}

/// Parse `input`, fetch the repository it names and build its graph.
/// An unparseable address fails before any request is made.
pub async fn execute_visualize(
    input: &str,
    options: VisualizeOptions,
    progress_callback: Option<VisualizeProgressCallback>,
) -> Result<Visualization, VisualizeError> {
    let VisualizeOptions {
        config,
        show_progress,
    } = options;

    let repository =
        parse_repository_url(input).ok_or_else(|| VisualizeError::InvalidUrl(INVALID_URL_MESSAGE.to_string()))?;
    info!("Visualizing {}", repository);

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Loading branches and commits for {}...", repository));
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetched_branches = Arc::new(AtomicUsize::new(0));
    let spinner_clone = spinner.clone();
    let fetched_clone = fetched_branches.clone();
    let internal_callback: ProgressCallback = Arc::new(move |event: FetchProgress| {
        if let FetchProgress::CommitsFetched { .. } = event {
            fetched_clone.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(ref pb) = spinner_clone {
            pb.set_message(describe_progress(&event));
        }
        if let Some(ref callback) = progress_callback {
            callback(describe_progress(&event));
        }
    });

    let result = fetch_graph(&config, &repository, Some(internal_callback)).await;

    if let Some(ref pb) = spinner {
        match result {
            Ok(ref graph) => pb.finish_with_message(format!(
                "Loaded {} branches, {} nodes",
                fetched_branches.load(Ordering::Relaxed),
                graph.nodes.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    Ok(Visualization {
        repository,
        graph: result?,
    })
}
