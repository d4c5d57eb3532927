mod outcome;
mod result;
mod task;

pub use outcome::{BuildFailure, BuildOutcome};
pub use result::RequestedTasksResult;
pub use task::{TaskRecord, TaskState};
