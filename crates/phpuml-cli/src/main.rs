//! phpuml CLI - Convert PHP classes and interfaces to nomnoml diagrams

mod cli;
mod colorizer;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is configured inside run() once the flags are known
    let app = cli::PhpUmlApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
