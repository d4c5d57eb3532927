use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use console::{Term, style};
use serde::Serialize;

use crate::commands::plugins::PluginStatus;
use crate::commands::run::RunSummary;
use crate::config::TaskDef;
use crate::flow::FlowReport;
use crate::models::{BuildOutcome, RequestedTasksResult, TaskState};

const WRAP_WIDTH: usize = 100;

pub struct Output {
    term: Term,
    err: Term,
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            term: Term::stdout(),
            err: Term::stderr(),
            json,
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.term.write_line(&output)?;
        Ok(())
    }

    pub fn initialized(&self, path: &Path) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Wrote").green(),
            style(path.display()).cyan().bold()
        ))?;
        Ok(())
    }

    pub fn already_initialized(&self, path: &Path) -> Result<()> {
        self.term.write_line(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        Ok(())
    }

    /// Printed once the requested tasks are done, before end-of-build actions run.
    pub fn build_finished(&self, result: &RequestedTasksResult) -> Result<()> {
        if self.json {
            return Ok(());
        }

        for task in &result.tasks {
            let state = match task.state {
                TaskState::Succeeded => style(task.state.as_ref()).green(),
                TaskState::Failed => style(task.state.as_ref()).red(),
                TaskState::Pending | TaskState::Skipped => style(task.state.as_ref()).dim(),
            };
            self.term.write_line(&format!(
                "> Task :{} [{}]",
                style(&task.name).cyan(),
                state
            ))?;
        }

        if let Some(failure) = &result.failure {
            self.term.write_line("")?;
            self.term
                .write_line(&style("What went wrong:").bold().to_string())?;
            for line in textwrap::wrap(&failure.message, WRAP_WIDTH) {
                self.term.write_line(&format!("  {line}"))?;
            }
        }

        self.term.write_line("")?;
        let banner = match result.outcome() {
            BuildOutcome::Success => style("BUILD SUCCESSFUL").green().bold(),
            BuildOutcome::Failure => style("BUILD FAILED").red().bold(),
        };
        self.term.write_line(&format!(
            "{banner} in {}ms ({} succeeded, {} failed, {} skipped)",
            result.elapsed_ms(),
            result.count(TaskState::Succeeded),
            result.count(TaskState::Failed),
            result.count(TaskState::Skipped),
        ))?;
        Ok(())
    }

    /// End-of-build diagnostics for actions that errored. Always on stderr.
    pub fn flow_failures(&self, report: &FlowReport) -> Result<()> {
        for failure in &report.failures {
            let message = failure.error.to_string();
            self.err.write_line(&format!(
                "{} {} ({})",
                style("End-of-build action failed:").yellow(),
                style(&failure.action).cyan(),
                failure.token
            ))?;
            for line in textwrap::wrap(&message, WRAP_WIDTH) {
                self.err.write_line(&format!("  {line}"))?;
            }
        }
        Ok(())
    }

    pub fn run_summary(&self, summary: &RunSummary) -> Result<()> {
        if self.json {
            return self.print_json(summary);
        }
        Ok(())
    }

    pub fn task_list(&self, tasks: &BTreeMap<String, TaskDef>, defaults: &[String]) -> Result<()> {
        if self.json {
            return self.print_json(tasks);
        }

        if tasks.is_empty() {
            self.term.write_line("No tasks declared.")?;
            return Ok(());
        }

        for (name, def) in tasks {
            let marker = if defaults.contains(name) {
                style(" (default)").dim().to_string()
            } else {
                String::new()
            };
            self.term
                .write_line(&format!("{}{marker}", style(name).cyan().bold()))?;
            if let Some(description) = &def.description {
                self.term
                    .write_line(&format!("  Description: {description}"))?;
            }
            if !def.command.is_empty() {
                self.term
                    .write_line(&format!("  Command: {}", def.command.join(" ")))?;
            }
            if let Some(message) = &def.fail {
                self.term.write_line(&format!(
                    "  Fails with: {}",
                    style(message).red()
                ))?;
            }
        }
        Ok(())
    }

    pub fn plugin_list(&self, plugins: &[PluginStatus]) -> Result<()> {
        if self.json {
            return self.print_json(plugins);
        }

        for plugin in plugins {
            let state = if plugin.enabled {
                style("enabled").green()
            } else {
                style("disabled").dim()
            };
            self.term.write_line(&format!(
                "{} [{}]",
                style(plugin.id.as_ref()).cyan().bold(),
                state
            ))?;
            self.term
                .write_line(&format!("  {}", plugin.description))?;
        }
        Ok(())
    }
}
