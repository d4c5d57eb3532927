use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{BuildFailure, BuildOutcome, TaskRecord, TaskState};

/// The terminal result of the requested tasks of one build invocation.
///
/// `failure` is present when configuration failed, a requested task could not
/// be resolved, or any executed task failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedTasksResult {
    pub build_id: String,
    pub requested: Vec<String>,
    pub tasks: Vec<TaskRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BuildFailure>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl RequestedTasksResult {
    pub fn outcome(&self) -> BuildOutcome {
        BuildOutcome::from(self)
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.tasks.iter().filter(|t| t.state == state).count()
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.finished_at
            .duration_since(self.started_at)
            .as_millis()
            .try_into()
            .unwrap_or(i64::MAX)
    }
}
