use colored::Colorize;
use repograph::{command_argument_builder, handle_graph, handle_ui, init_tracing};
use repograph_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        // No subcommand provided, just show the banner
        None => return,
        Some(("ui", primary_command)) => handle_ui(primary_command).await,
        Some(("graph", primary_command)) => {
            init_tracing(verbose, quiet);
            handle_graph(primary_command, quiet).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
