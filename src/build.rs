//! A minimal stand-in for the host build: resolves requested task names
//! against the project's declared tasks and runs them in order.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Instant;

use jiff::Timestamp;
use tracing::{debug, info};

use crate::config::TaskDef;
use crate::helpers::find_similar_name;
use crate::id::generate_id;
use crate::models::{BuildFailure, RequestedTasksResult, TaskRecord};
use crate::plugins::{ExecOperations, ExecSpec, ProcessExec};
use crate::project::Project;

pub const CONFIG_FAILURE: &str = "Simulated configuration failure.";

pub struct Build<'a> {
    project: &'a Project,
    exec: Arc<dyn ExecOperations>,
    continue_on_failure: bool,
    fail_config: bool,
}

impl<'a> Build<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            exec: Arc::new(ProcessExec),
            continue_on_failure: false,
            fail_config: false,
        }
    }

    pub fn with_exec(mut self, exec: Arc<dyn ExecOperations>) -> Self {
        self.exec = exec;
        self
    }

    /// Keep running the remaining tasks after one fails.
    pub fn continue_on_failure(mut self, yes: bool) -> Self {
        self.continue_on_failure = yes;
        self
    }

    /// Fail before any task runs, as a broken build script would.
    pub fn fail_config(mut self, yes: bool) -> Self {
        self.fail_config = yes;
        self
    }

    /// Runs `requested` (or the configured default tasks when empty) and
    /// returns the terminal result. Never errors: every problem is recorded
    /// as the result's failure.
    pub fn execute(&self, requested: &[String]) -> RequestedTasksResult {
        let started_at = Timestamp::now();
        let build_id = generate_id();
        let config = self.project.config();
        let requested: Vec<String> = if requested.is_empty() {
            config.default_tasks.clone()
        } else {
            requested.to_vec()
        };
        info!(%build_id, tasks = ?requested, "starting build");

        let mut result = RequestedTasksResult {
            build_id,
            requested: requested.clone(),
            tasks: Vec::new(),
            failure: None,
            started_at,
            finished_at: started_at,
        };

        if self.fail_config {
            result.failure = Some(BuildFailure::new(CONFIG_FAILURE));
            result.finished_at = Timestamp::now();
            return result;
        }

        let mut resolved: Vec<(&str, &TaskDef)> = Vec::with_capacity(requested.len());
        for name in &requested {
            match config.tasks.get_key_value(name) {
                Some((name, def)) => resolved.push((name.as_str(), def)),
                None => {
                    result.failure = Some(BuildFailure::new(self.unknown_task(name)));
                    result.finished_at = Timestamp::now();
                    return result;
                }
            }
        }

        for (name, def) in resolved {
            let mut record = TaskRecord::pending(name, def.description.clone());

            if result.failure.is_some() && !self.continue_on_failure {
                record.skip();
                result.tasks.push(record);
                continue;
            }

            let start = Instant::now();
            let outcome = self.run_task(def);
            let elapsed_ms = i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX);
            match outcome {
                Ok(()) => {
                    debug!(task = name, elapsed_ms, "task succeeded");
                    record.succeed(elapsed_ms);
                }
                Err(message) => {
                    debug!(task = name, %message, "task failed");
                    if result.failure.is_none() {
                        result.failure = Some(BuildFailure::new(format!(
                            "Execution failed for task '{name}': {message}"
                        )));
                    }
                    record.fail(elapsed_ms, BuildFailure::new(message));
                }
            }
            result.tasks.push(record);
        }

        result.finished_at = Timestamp::now();
        result
    }

    fn run_task(&self, def: &TaskDef) -> Result<(), String> {
        if let Some(message) = &def.fail {
            return Err(message.clone());
        }
        let Some((program, args)) = def.command.split_first() else {
            return Ok(());
        };
        let spec = ExecSpec {
            program: program.clone(),
            args: args.iter().map(OsString::from).collect(),
            ignore_exit_value: false,
        };
        self.exec
            .exec(&spec)
            .map(|_| ())
            .map_err(|err| format!("{err:#}"))
    }

    fn unknown_task(&self, name: &str) -> String {
        let declared = self.project.config().tasks.keys().map(String::as_str);
        match find_similar_name(name, declared) {
            Some(suggestion) => format!("Task '{name}' not found\nDid you mean: {suggestion}"),
            None => format!("Task '{name}' not found"),
        }
    }
}
