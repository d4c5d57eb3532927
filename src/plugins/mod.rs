pub mod lavalamp;
pub mod soundfeedback;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::flow::{FlowScope, RegistrationToken};
use crate::project::Project;

pub use lavalamp::{LavaLamp, LavaLampPlugin, SetLavaLampColor};
pub use soundfeedback::{ExecOperations, ExecSpec, PlayMediaFile, ProcessExec, SoundFeedbackPlugin};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PluginId {
    Lavalamp,
    Soundfeedback,
}

impl PluginId {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Lavalamp => "Makes the lava lamp shine green or red at the end of the build",
            Self::Soundfeedback => "Plays a sound at the end of the build",
        }
    }
}

/// Something that hooks into the end of a build.
pub trait Plugin {
    fn id(&self) -> PluginId;

    fn apply(&self, project: &Project, scope: &mut FlowScope) -> RegistrationToken;
}

/// The service handles plugins are built with. Owned by the caller and
/// shared with every plugin it creates.
pub struct PluginHost {
    lamp: Arc<LavaLamp>,
    exec: Arc<dyn ExecOperations>,
}

impl PluginHost {
    pub fn new(lamp: Arc<LavaLamp>, exec: Arc<dyn ExecOperations>) -> Self {
        Self { lamp, exec }
    }

    /// Lamp on stdout, sounds through real processes.
    pub fn stdout() -> Self {
        Self::new(Arc::new(LavaLamp::stdout()), Arc::new(ProcessExec))
    }

    /// Lamp on stderr, keeping stdout free for machine-readable output.
    pub fn stderr() -> Self {
        Self::new(Arc::new(LavaLamp::stderr()), Arc::new(ProcessExec))
    }

    pub fn plugin(&self, id: PluginId) -> Box<dyn Plugin> {
        match id {
            PluginId::Lavalamp => Box::new(LavaLampPlugin::new(Arc::clone(&self.lamp))),
            PluginId::Soundfeedback => Box::new(SoundFeedbackPlugin::new(Arc::clone(&self.exec))),
        }
    }

    /// Applies each distinct plugin in `ids` once, in order.
    pub fn apply(&self, ids: &[PluginId], project: &Project, scope: &mut FlowScope) -> Vec<PluginId> {
        let mut applied: Vec<PluginId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if applied.contains(&id) {
                continue;
            }
            self.plugin(id).apply(project, scope);
            applied.push(id);
        }
        applied
    }
}
