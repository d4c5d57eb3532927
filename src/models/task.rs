use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::BuildFailure;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum TaskState {
    Pending,
    Succeeded,
    Failed,
    Skipped,
}

/// What happened to one requested task during a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: TaskState,
    pub elapsed_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BuildFailure>,
}

impl TaskRecord {
    pub fn pending(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            state: TaskState::Pending,
            elapsed_ms: 0,
            failure: None,
        }
    }

    pub fn succeed(&mut self, elapsed_ms: i64) {
        self.state = TaskState::Succeeded;
        self.elapsed_ms = elapsed_ms;
    }

    pub fn fail(&mut self, elapsed_ms: i64, failure: BuildFailure) {
        self.state = TaskState::Failed;
        self.elapsed_ms = elapsed_ms;
        self.failure = Some(failure);
    }

    pub fn skip(&mut self) {
        self.state = TaskState::Skipped;
    }
}
