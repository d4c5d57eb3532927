use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::RequestedTasksResult;

/// The terminal classification of a build. Computed once, never re-evaluated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum BuildOutcome {
    Success,
    Failure,
}

impl BuildOutcome {
    pub fn from_failed(failed: bool) -> Self {
        if failed { Self::Failure } else { Self::Success }
    }

    pub fn failed(self) -> bool {
        self == Self::Failure
    }
}

impl From<&RequestedTasksResult> for BuildOutcome {
    fn from(result: &RequestedTasksResult) -> Self {
        Self::from_failed(result.failure.is_some())
    }
}

/// The recorded error of a failed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFailure {
    pub message: String,
}

impl BuildFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
