use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::build::Build;
use crate::flow::{FlowReport, FlowScope};
use crate::models::RequestedTasksResult;
use crate::plugins::{PluginHost, PluginId};
use crate::project::Project;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub tasks: Vec<String>,
    /// Overrides the plugins enabled in the config.
    pub plugins: Option<Vec<PluginId>>,
    pub no_plugins: bool,
    pub continue_on_failure: bool,
    pub fail_config: bool,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub plugins: Vec<PluginId>,
    pub result: RequestedTasksResult,
    pub flow: FlowReport,
}

/// Runs one build with end-of-build actions attached.
///
/// `scope` may already carry actions registered by the caller; the enabled
/// plugins are added to it. `on_finished` sees the result after the tasks
/// are done and before any end-of-build action runs.
pub fn run(
    project: &Project,
    options: RunOptions,
    host: &PluginHost,
    mut scope: FlowScope,
    on_finished: impl FnOnce(&RequestedTasksResult) -> Result<()>,
) -> Result<RunSummary> {
    let ids = if options.no_plugins {
        Vec::new()
    } else {
        options
            .plugins
            .unwrap_or_else(|| project.config().plugins.clone())
    };
    let plugins = host.apply(&ids, project, &mut scope);

    let result = Build::new(project)
        .continue_on_failure(options.continue_on_failure)
        .fail_config(options.fail_config)
        .execute(&options.tasks);

    let printed = on_finished(&result);
    let flow = scope.finish(&result);
    info!(
        build_id = %result.build_id,
        outcome = %flow.outcome,
        actions = flow.executed.len(),
        failed_actions = flow.failures.len(),
        "build finished"
    );
    printed?;

    Ok(RunSummary {
        plugins,
        result,
        flow,
    })
}
