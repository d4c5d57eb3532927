use serde::Serialize;

use crate::plugins::PluginId;
use crate::project::Project;

#[derive(Debug, Serialize)]
pub struct PluginStatus {
    pub id: PluginId,
    pub enabled: bool,
    pub description: &'static str,
}

pub fn run(project: &Project) -> Vec<PluginStatus> {
    let enabled = &project.config().plugins;
    PluginId::all()
        .map(|id| PluginStatus {
            id,
            enabled: enabled.contains(&id),
            description: id.description(),
        })
        .collect()
}
