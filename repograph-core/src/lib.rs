use colored::Colorize;

pub mod config;
pub mod graph;
pub mod repo_url;
pub mod report;
pub mod session;
pub mod visualize;

pub use config::VisualizerConfig;
pub use graph::{GraphEdge, GraphNode, NodeGroup, RepoGraph, shape_graph, truncate_label};
pub use repo_url::parse_repository_url;
pub use repograph_fetcher::{FetchError, RepositoryReference};
pub use session::{Session, Submission, ViewState};
pub use visualize::{Visualization, VisualizeError, execute_visualize, fetch_graph};

const BANNER: &str = r#"
  ┌─┐┌─┐┌─┐┌─┐┌─┐┬─┐┌─┐┌─┐┬ ┬
  ├┬┘├┤ ├─┘│ ││ ┬├┬┘├─┤├─┘├─┤
  ┴└─└─┘┴  └─┘└─┘┴└─┴ ┴┴  ┴ ┴
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "branches and commits, drawn".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
