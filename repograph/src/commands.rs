use crate::CLAP_STYLING;
use clap::{arg, command};
use repograph_core::config::{DEFAULT_HUB_BRANCH, TOKEN_ENV_VAR};
use repograph_fetcher::client::DEFAULT_API_BASE;
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("repograph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("repograph")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(arg!(-v --"verbose" "Log every API request").required(false))
        .subcommand_required(false)
        .subcommand(with_fetch_args(
            command!("ui")
                .about("Open the interactive branch and commit diagram in the terminal")
                .arg(
                    arg!([URL])
                        .required(false)
                        .help("Repository to load on start, e.g. https://github.com/octocat/Hello-World"),
                ),
        ))
        .subcommand(with_fetch_args(
            command!("graph")
                .about("Fetch a repository once and print or save its branch and commit graph")
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("Repository URL, e.g. https://github.com/octocat/Hello-World"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, dot")
                        .value_parser(["text", "json", "dot"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                ),
        ))
}

/// Options shared by every command that talks to the API
fn with_fetch_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"token" <TOKEN>)
            .required(false)
            .help("API token; raises the rate limit and allows private repositories")
            .env(TOKEN_ENV_VAR)
            .hide_env_values(true),
    )
    .arg(
        arg!(--"api-url" <URL>)
            .required(false)
            .help("Base URL of the GitHub REST API")
            .value_parser(clap::value_parser!(Url))
            .default_value(DEFAULT_API_BASE),
    )
    .arg(
        arg!(-c --"commits" <COUNT>)
            .required(false)
            .help("Most recent commits to show per branch")
            .value_parser(clap::value_parser!(usize))
            .default_value("5"),
    )
    .arg(
        arg!(-t --"concurrency" <NUM_REQUESTS>)
            .required(false)
            .help("Maximum commit requests in flight at once")
            .value_parser(clap::value_parser!(usize))
            .default_value("8"),
    )
    .arg(
        arg!(--"default-branch" <BRANCH>)
            .required(false)
            .help("Branch drawn as the hub every other branch hangs off")
            .default_value(DEFAULT_HUB_BRANCH),
    )
}
