//! Plays a sound matching the build outcome.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::{Plugin, PluginId};
use crate::flow::{FlowAction, FlowScope, OutcomeMap, RegistrationToken};
use crate::models::BuildOutcome;
use crate::project::Project;

/// A process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    pub program: String,
    pub args: Vec<OsString>,
    pub ignore_exit_value: bool,
}

/// Runs external processes to completion.
pub trait ExecOperations {
    /// Runs `spec`, returning the exit code if the process produced one.
    ///
    /// A non-zero exit is an error unless `spec.ignore_exit_value` is set.
    fn exec(&self, spec: &ExecSpec) -> Result<Option<i32>>;
}

/// [`ExecOperations`] backed by `std::process`. Blocks until the child exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExec;

impl ExecOperations for ProcessExec {
    fn exec(&self, spec: &ExecSpec) -> Result<Option<i32>> {
        let status = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to start {}", spec.program))?;

        if !status.success() && !spec.ignore_exit_value {
            bail!("{} exited with status {status}", spec.program);
        }
        Ok(status.code())
    }
}

/// Plays the media file chosen for the outcome with an external player.
///
/// Playback is best effort: a missing player, a missing file or a non-zero
/// exit is logged and otherwise ignored.
pub struct PlayMediaFile {
    exec: Arc<dyn ExecOperations>,
    player: String,
    player_args: Vec<String>,
    media_files: OutcomeMap<PathBuf>,
}

impl PlayMediaFile {
    pub fn new(
        exec: Arc<dyn ExecOperations>,
        player: String,
        player_args: Vec<String>,
        media_files: OutcomeMap<PathBuf>,
    ) -> Self {
        Self {
            exec,
            player,
            player_args,
            media_files,
        }
    }

    pub fn spec_for(&self, outcome: BuildOutcome) -> ExecSpec {
        let mut args: Vec<OsString> = self.player_args.iter().map(OsString::from).collect();
        args.push(self.media_files.resolve(outcome).clone().into_os_string());
        ExecSpec {
            program: self.player.clone(),
            args,
            ignore_exit_value: true,
        }
    }
}

impl FlowAction for PlayMediaFile {
    fn name(&self) -> &str {
        "play-media-file"
    }

    fn execute(&self, outcome: BuildOutcome) -> Result<()> {
        let spec = self.spec_for(outcome);
        match self.exec.exec(&spec) {
            Ok(Some(0)) => debug!(player = %spec.program, "played build sound"),
            Ok(code) => debug!(player = %spec.program, ?code, "player exited unsuccessfully"),
            Err(err) => debug!(player = %spec.program, "could not play build sound: {err:#}"),
        }
        Ok(())
    }
}

pub struct SoundFeedbackPlugin {
    exec: Arc<dyn ExecOperations>,
}

impl SoundFeedbackPlugin {
    pub fn new(exec: Arc<dyn ExecOperations>) -> Self {
        Self { exec }
    }
}

impl Plugin for SoundFeedbackPlugin {
    fn id(&self) -> PluginId {
        PluginId::Soundfeedback
    }

    fn apply(&self, project: &Project, scope: &mut FlowScope) -> RegistrationToken {
        let sound = &project.config().sound;
        // Paths are made absolute now; the player may run from anywhere.
        let media_files = sound.media_files().map(|path| project.file(path));
        let action = PlayMediaFile::new(
            Arc::clone(&self.exec),
            sound.player.clone(),
            sound.player_args.clone(),
            media_files,
        );
        scope.always_once(self.id().as_ref(), action)
    }
}
