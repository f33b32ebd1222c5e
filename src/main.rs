use clap::Parser;
use std::process::ExitCode;

use issuedesk::cli::Cli;
use issuedesk::commands::OutputOptions;
use issuedesk::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = OutputOptions { json: cli.json };
    match cli.command.run(output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
