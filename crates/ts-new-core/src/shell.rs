//! External command execution
//!
//! Every git and package-manager invocation goes through [`CommandRunner`] so
//! that provisioning steps can be exercised without the real tools.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// What to do with a child's output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture stdout and stderr for the caller
    Capture,
    /// Discard stdout; stderr is still captured for error reporting
    Suppress,
}

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub output: OutputMode,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            output: OutputMode::Capture,
        }
    }

    /// Run with `dir` as the working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Discard the child's stdout
    pub fn suppressed(mut self) -> Self {
        self.output = OutputMode::Suppress;
        self
    }

    /// Program followed by its arguments, space separated
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion; non-zero exit is an [`Error::ExternalCommand`]
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, cwd = ?spec.cwd, "running command");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        match spec.output {
            OutputMode::Capture => cmd.stdout(Stdio::piped()),
            OutputMode::Suppress => cmd.stdout(Stdio::null()),
        };
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| Error::ExternalCommand {
            command: spec.command_line(),
            code: None,
            stderr: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            debug!(command = %spec, code = ?output.status.code(), "command failed");
            return Err(Error::ExternalCommand {
                command: spec.command_line(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_line_joins_program_and_args() {
        let spec = CommandSpec::new("git", ["commit", "-m", "chore: initial commit"]);
        assert_eq!(spec.command_line(), "git commit -m chore: initial commit");
        assert_eq!(spec.output, OutputMode::Capture);
    }

    #[test]
    fn test_builder_sets_cwd_and_output() {
        let spec = CommandSpec::new("npm", ["install"])
            .current_dir("/tmp/app")
            .suppressed();
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp/app")));
        assert_eq!(spec.output, OutputMode::Suppress);
    }

    #[tokio::test]
    async fn test_missing_program_is_external_command_error() {
        let spec = CommandSpec::new("ts-new-definitely-not-a-real-binary", ["--version"]);
        let err = SystemRunner.run(&spec).await.unwrap_err();
        match err {
            Error::ExternalCommand { command, code, .. } => {
                assert_eq!(command, "ts-new-definitely-not-a-real-binary --version");
                assert_eq!(code, None);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
