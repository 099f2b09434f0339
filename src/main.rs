//! SeekFS - parallel file search and duplicate detection
//!
//! Entry point for the seekfs CLI application.

use clap::error::ErrorKind;
use clap::Parser;
use seekfs::{
    cli::{Cli, OutputFormat},
    error::{ExitCode, StructuredError},
    logging,
};

fn main() -> std::process::ExitCode {
    // Usage errors exit with 1, not clap's default of 2
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::GeneralError,
            };
            let _ = err.print();
            return code.into();
        }
    };
    logging::init_logging(cli.verbose, cli.quiet);

    // Config file and environment can select JSON too
    let config = seekfs::resolve_config(&cli);
    let json_errors = config.output == OutputFormat::Json;

    match seekfs::run_app(cli, config) {
        Ok(code) => code.into(),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            exit_code.into()
        }
    }
}
