//! Makes an (imaginary) lava lamp shine in a color matching the build outcome.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use console::Term;

use super::{Plugin, PluginId};
use crate::flow::{FlowAction, FlowScope, OutcomeMap, RegistrationToken};
use crate::models::BuildOutcome;
use crate::project::Project;

/// Controls a lava lamp connected to the system.
///
/// One handle is built per build and shared with whichever actions need it.
pub struct LavaLamp {
    out: Mutex<Box<dyn Write + Send>>,
}

impl LavaLamp {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Term::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(Term::stderr())
    }

    pub fn set_color(&self, color: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("Lava lamp output lock poisoned"))?;
        writeln!(out, "Lava lamp is shining {color}.").context("Failed to write lamp color")?;
        out.flush().context("Failed to flush lamp output")
    }
}

/// Makes the given lamp shine in the color chosen for the outcome.
pub struct SetLavaLampColor {
    lamp: Arc<LavaLamp>,
    colors: OutcomeMap<String>,
}

impl SetLavaLampColor {
    pub fn new(lamp: Arc<LavaLamp>, colors: OutcomeMap<String>) -> Self {
        Self { lamp, colors }
    }
}

impl FlowAction for SetLavaLampColor {
    fn name(&self) -> &str {
        "set-lava-lamp-color"
    }

    fn execute(&self, outcome: BuildOutcome) -> Result<()> {
        self.lamp.set_color(self.colors.resolve(outcome))
    }
}

pub struct LavaLampPlugin {
    lamp: Arc<LavaLamp>,
}

impl LavaLampPlugin {
    pub fn new(lamp: Arc<LavaLamp>) -> Self {
        Self { lamp }
    }
}

impl Plugin for LavaLampPlugin {
    fn id(&self) -> PluginId {
        PluginId::Lavalamp
    }

    fn apply(&self, project: &Project, scope: &mut FlowScope) -> RegistrationToken {
        let action = SetLavaLampColor::new(Arc::clone(&self.lamp), project.config().lamp.colors());
        scope.always_once(self.id().as_ref(), action)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{BuildFailure, RequestedTasksResult};
    use jiff::Timestamp;
    use rstest::rstest;

    /// A writer whose contents stay readable after being handed to a lamp.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn result(failed: bool) -> RequestedTasksResult {
        let now = Timestamp::now();
        RequestedTasksResult {
            build_id: "b".to_string(),
            requested: Vec::new(),
            tasks: Vec::new(),
            failure: failed.then(|| BuildFailure::new("Simulated task failure.")),
            started_at: now,
            finished_at: now,
        }
    }

    #[rstest]
    #[case::success(false, "Lava lamp is shining green.\n")]
    #[case::failure(true, "Lava lamp is shining red.\n")]
    fn lamp_shines_outcome_color(#[case] failed: bool, #[case] expected: &str) {
        let buf = SharedBuf::default();
        let plugin = LavaLampPlugin::new(Arc::new(LavaLamp::new(buf.clone())));
        let project = Project::new(".", Config::default());
        let mut scope = FlowScope::new();
        plugin.apply(&project, &mut scope);

        let report = scope.finish(&result(failed));

        assert!(report.is_clean());
        assert_eq!(buf.contents(), expected);
    }

    #[test]
    fn colors_come_from_config() {
        let buf = SharedBuf::default();
        let lamp = Arc::new(LavaLamp::new(buf.clone()));
        let mut config = Config::default();
        config.lamp.failure = "purple".to_string();
        let project = Project::new(".", config);
        let mut scope = FlowScope::new();
        LavaLampPlugin::new(lamp).apply(&project, &mut scope);

        scope.finish(&result(true));
        assert_eq!(buf.contents(), "Lava lamp is shining purple.\n");
    }

    // Applying the plugin twice against one scope still lights the lamp once.
    #[test]
    fn applying_twice_registers_once() {
        let buf = SharedBuf::default();
        let plugin = LavaLampPlugin::new(Arc::new(LavaLamp::new(buf.clone())));
        let project = Project::new(".", Config::default());
        let mut scope = FlowScope::new();

        let first = plugin.apply(&project, &mut scope);
        let second = plugin.apply(&project, &mut scope);
        assert_eq!(first, second);

        scope.finish(&result(false));
        assert_eq!(buf.contents().lines().count(), 1);
    }

    #[test]
    fn write_error_is_reported_not_fatal() {
        let action = SetLavaLampColor::new(
            Arc::new(LavaLamp::new(BrokenPipe)),
            Config::default().lamp.colors(),
        );
        let mut scope = FlowScope::new();
        scope.always(action);

        let report = scope.finish(&result(false));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].action, "set-lava-lamp-color");
    }
}
