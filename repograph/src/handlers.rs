use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use repograph_core::report::{ReportFormat, generate_report, save_report};
use repograph_core::visualize::VisualizeOptions;
use repograph_core::{RepositoryReference, VisualizerConfig, execute_visualize};
use repograph_tui::UiOptions;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing::Level;
use url::Url;

/// Log level for the CLI. The spinner already reports progress, so only
/// warnings get through by default and `-q` leaves errors alone.
pub fn tracing_level(verbose: bool, quiet: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Logs go to stderr so a report on stdout can be piped
pub fn init_tracing(verbose: bool, quiet: bool) {
    let level = tracing_level(verbose, quiet);
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Build the fetch configuration from the shared API flags
pub fn config_from_matches(args: &ArgMatches) -> VisualizerConfig {
    let mut config = VisualizerConfig::default().with_token(
        args.get_one::<String>("token")
            .filter(|t| !t.trim().is_empty())
            .cloned(),
    );

    if let Some(api_base) = args.get_one::<Url>("api-url") {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(commits) = args.get_one::<usize>("commits") {
        config = config.with_commits_per_branch(*commits);
    }
    if let Some(limit) = args.get_one::<usize>("concurrency") {
        config = config.with_max_concurrency(*limit);
    }
    if let Some(branch) = args.get_one::<String>("default-branch") {
        config = config.with_default_branch(branch.as_str());
    }

    config
}

pub fn expand_output_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// An existing directory gets a file named after the repository and format
pub fn resolve_output_path(path: &str, repository: &RepositoryReference, format: ReportFormat) -> PathBuf {
    let path = expand_output_path(path);
    if path.is_dir() {
        path.join(format!(
            "{}-{}.{}",
            repository.owner,
            repository.name,
            format.extension()
        ))
    } else {
        path
    }
}

pub async fn handle_graph(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches
        .get_one::<String>("URL")
        .context("a repository URL is required")?;
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<String>("output");

    let options = VisualizeOptions {
        config: config_from_matches(sub_matches),
        // Debug lines would tear through the spinner
        show_progress: !quiet && !tracing::enabled!(Level::DEBUG),
    };
    let visualization = execute_visualize(url, options, None).await?;

    let report = generate_report(format, &visualization.repository, &visualization.graph)
        .context("Failed to serialize report")?;

    match output {
        Some(path) => {
            let path = resolve_output_path(path, &visualization.repository, format);
            save_report(&report, &path).with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                println!("{} Report saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}

/// Run the interactive view on a blocking thread; fetches stay on the runtime
pub async fn handle_ui(sub_matches: &ArgMatches) -> Result<()> {
    let options = UiOptions {
        config: config_from_matches(sub_matches),
        initial_url: sub_matches.get_one::<String>("URL").cloned(),
    };
    let runtime = Handle::current();

    tokio::task::spawn_blocking(move || repograph_tui::run(options, runtime))
        .await
        .context("Terminal UI thread panicked")??;

    Ok(())
}
