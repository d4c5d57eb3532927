//! End-of-build outcome dispatch.
//!
//! A [`FlowScope`] collects callbacks while a build is being set up. When the
//! host has finished every requested task it hands the terminal
//! [`RequestedTasksResult`] to [`FlowScope::finish`], which classifies it once
//! and runs each registered [`FlowAction`] with that same [`BuildOutcome`].
//!
//! `finish` consumes the scope, so a registered action runs at most once.
//! Actions never feed back into the outcome: an error or panic raised by one
//! action is recorded in the [`FlowReport`] and the remaining actions still
//! run.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{BuildOutcome, RequestedTasksResult};

/// Deferred work run once after the build's requested tasks complete.
pub trait FlowAction {
    fn name(&self) -> &str;

    fn execute(&self, outcome: BuildOutcome) -> Result<()>;
}

/// A [`FlowAction`] backed by a closure.
pub struct FnAction<F> {
    name: String,
    f: F,
}

impl<F> FlowAction for FnAction<F>
where
    F: Fn(BuildOutcome) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, outcome: BuildOutcome) -> Result<()> {
        (self.f)(outcome)
    }
}

pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnAction<F>
where
    F: Fn(BuildOutcome) -> Result<()>,
{
    FnAction {
        name: name.into(),
        f,
    }
}

/// Picks one of two pre-chosen signals for an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMap<T> {
    pub success: T,
    pub failure: T,
}

impl<T> OutcomeMap<T> {
    pub fn new(success: T, failure: T) -> Self {
        Self { success, failure }
    }

    pub fn resolve(&self, outcome: BuildOutcome) -> &T {
        match outcome {
            BuildOutcome::Success => &self.success,
            BuildOutcome::Failure => &self.failure,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OutcomeMap<U> {
        OutcomeMap {
            success: f(self.success),
            failure: f(self.failure),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegistrationToken(usize);

impl fmt::Display for RegistrationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum FlowError {
    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

/// An action that did not complete cleanly.
#[derive(Debug, Clone, Serialize)]
pub struct FlowFailure {
    pub token: RegistrationToken,
    pub action: String,
    pub error: FlowError,
}

/// What happened when a scope was finished.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub outcome: BuildOutcome,
    pub executed: Vec<RegistrationToken>,
    pub failures: Vec<FlowFailure>,
}

impl FlowReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Registered {
    token: RegistrationToken,
    action: Box<dyn FlowAction>,
}

#[derive(Default)]
pub struct FlowScope {
    actions: Vec<Registered>,
    keys: HashMap<String, RegistrationToken>,
    finished: bool,
}

impl FlowScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` to run once the build finishes, whatever its outcome.
    pub fn always<A>(&mut self, action: A) -> RegistrationToken
    where
        A: FlowAction + 'static,
    {
        let token = RegistrationToken(self.actions.len());
        debug!(%token, action = action.name(), "registered flow action");
        self.actions.push(Registered {
            token,
            action: Box::new(action),
        });
        token
    }

    /// Like [`always`](Self::always), but only the first registration under
    /// `key` is kept. Later calls return the existing token and drop `action`.
    pub fn always_once<A>(&mut self, key: &str, action: A) -> RegistrationToken
    where
        A: FlowAction + 'static,
    {
        if let Some(token) = self.keys.get(key) {
            debug!(%token, key, "flow action already registered");
            return *token;
        }
        let token = self.always(action);
        self.keys.insert(key.to_owned(), token);
        token
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Classifies `result` and runs every registered action with that outcome,
    /// in registration order.
    pub fn finish(mut self, result: &RequestedTasksResult) -> FlowReport {
        self.finished = true;
        let outcome = BuildOutcome::from(result);
        let actions = std::mem::take(&mut self.actions);

        let mut report = FlowReport {
            outcome,
            executed: Vec::with_capacity(actions.len()),
            failures: Vec::new(),
        };

        for Registered { token, action } in actions {
            debug!(%token, action = action.name(), %outcome, "running flow action");
            let run = panic::catch_unwind(AssertUnwindSafe(|| action.execute(outcome)));
            report.executed.push(token);

            let error = match run {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => FlowError::Failed(format!("{err:#}")),
                Err(payload) => FlowError::Panicked(panic_message(&*payload)),
            };
            warn!(%token, action = action.name(), %error, "flow action failed");
            report.failures.push(FlowFailure {
                token,
                action: action.name().to_owned(),
                error,
            });
        }

        report
    }
}

impl Drop for FlowScope {
    fn drop(&mut self) {
        if !self.finished && !self.actions.is_empty() {
            debug!(
                pending = self.actions.len(),
                "flow scope dropped before the build finished; actions not run"
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
