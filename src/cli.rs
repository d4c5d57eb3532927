use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::plugins::PluginId;

#[derive(Parser)]
#[command(name = "ab")]
#[command(about = "Lava lamps and sound effects at the end of every build", long_about = None)]
pub struct Cli {
    /// Project directory (defaults to the nearest directory holding afterbuild.toml)
    #[arg(long, short = 'p', global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default afterbuild.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Run tasks, then notify the enabled plugins of the outcome
    Run {
        /// Tasks to run (defaults to the configured default tasks)
        tasks: Vec<String>,

        /// Plugins to notify instead of the configured ones (comma-separated)
        #[arg(long = "plugin", value_delimiter = ',')]
        plugins: Option<Vec<PluginId>>,

        /// Do not notify any plugin
        #[arg(long, conflicts_with = "plugins")]
        no_plugins: bool,

        /// Keep running tasks after one fails
        #[arg(long = "continue")]
        continue_on_failure: bool,

        /// Simulate a broken build configuration
        #[arg(long)]
        fail_config: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tasks declared by the project
    Tasks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available plugins
    Plugins {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_plugins_and_tasks() {
        let cli = Cli::parse_from([
            "ab",
            "run",
            "ok",
            "fail",
            "--plugin",
            "lavalamp,soundfeedback",
            "--continue",
        ]);
        let Commands::Run {
            tasks,
            plugins,
            continue_on_failure,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(tasks, vec!["ok", "fail"]);
        assert_eq!(
            plugins,
            Some(vec![PluginId::Lavalamp, PluginId::Soundfeedback])
        );
        assert!(continue_on_failure);
    }

    #[test]
    fn unknown_plugin_is_rejected() {
        assert!(Cli::try_parse_from(["ab", "run", "--plugin", "disco"]).is_err());
    }
}
