use std::process::ExitCode;

use clap::Parser;

use afterbuild::cli::Cli;

fn main() -> ExitCode {
    afterbuild::init_logging();
    let cli = Cli::parse();

    match afterbuild::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
