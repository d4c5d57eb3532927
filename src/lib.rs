#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod build;
pub mod cli;
pub mod commands;
pub mod config;
pub mod flow;
pub mod helpers;
pub mod id;
pub mod models;
pub mod output;
pub mod plugins;
pub mod project;

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::init::InitResult;
use commands::run::RunOptions;
use flow::FlowScope;
use output::Output;
use plugins::PluginHost;
use project::Project;

pub use project::CONFIG_FILE;

/// Environment variable holding the log filter, e.g. `AFTERBUILD_LOG=debug`.
pub const LOG_ENV: &str = "AFTERBUILD_LOG";

/// Sends `tracing` output to stderr, filtered by [`LOG_ENV`] (warnings by default).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs a parsed command line. The exit code reflects the build outcome only;
/// end-of-build actions never change it.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let project_dir = cli.project_dir.as_deref();

    match cli.command {
        Commands::Init { force } => {
            let dir = match project_dir {
                Some(dir) => dir.to_path_buf(),
                None => std::env::current_dir()?,
            };
            let output = Output::new(false);
            match commands::init::run(&dir, force)? {
                InitResult::Written(path) => output.initialized(&path)?,
                InitResult::AlreadyExists(path) => output.already_initialized(&path)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            tasks,
            plugins,
            no_plugins,
            continue_on_failure,
            fail_config,
            json,
        } => {
            let project = Project::discover(project_dir)?;
            let output = Output::new(json);
            let host = if json {
                PluginHost::stderr()
            } else {
                PluginHost::stdout()
            };
            let options = RunOptions {
                tasks,
                plugins,
                no_plugins,
                continue_on_failure,
                fail_config,
            };

            let summary = commands::run::run(&project, options, &host, FlowScope::new(), |result| {
                output.build_finished(result)
            })?;
            output.flow_failures(&summary.flow)?;
            output.run_summary(&summary)?;

            Ok(if summary.result.outcome().failed() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Tasks { json } => {
            let project = Project::discover(project_dir)?;
            let config = project.config();
            Output::new(json).task_list(&config.tasks, &config.default_tasks)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Plugins { json } => {
            let project = Project::discover(project_dir)?;
            let plugins = commands::plugins::run(&project);
            Output::new(json).plugin_list(&plugins)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
