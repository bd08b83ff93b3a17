//! Error types for project provisioning

use crate::orchestrator::ProvisioningState;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the provisioning error type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a run stopped without an underlying fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// The user answered "no" at the confirmation prompt
    Declined,
    /// An interrupt signal arrived (Ctrl+C or a prompt aborted with Esc)
    Interrupted,
}

impl fmt::Display for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cancellation::Declined => write!(f, "declined by user"),
            Cancellation::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Provisioning error taxonomy
#[derive(Error, Debug)]
pub enum Error {
    /// A required tool is missing
    #[error("{tool} is needed to create a new project; unable to continue")]
    Environment { tool: String },

    /// None of the known package managers responded
    #[error("no available package managers found")]
    NoPackageManager,

    /// Template catalog or artifact could not be retrieved
    #[error("failed to {action} ({message})")]
    Network { action: String, message: String },

    /// The named template has no downloadable artifact
    #[error("template '{template}' not found")]
    TemplateNotFound { template: String },

    /// Copy, remove, rename, read or write failure
    #[error("failed to {action} {path}: {source}")]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An external command could not be spawned or exited non-zero
    #[error("command `{command}` failed{}{}", exit_suffix(.code), stderr_suffix(.stderr))]
    ExternalCommand {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Customizing the generated project failed
    #[error("failed to clean up template ({source})")]
    Customization {
        #[source]
        source: Box<Error>,
    },

    /// The package manager could not install dependencies
    #[error("failed to install dependencies using {package_manager} ({source})")]
    Install {
        package_manager: String,
        #[source]
        source: Box<Error>,
    },

    /// The project manifest is missing or malformed
    #[error("invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// The requested project name is unusable
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// The run was stopped by the user
    #[error("operation {0}")]
    Cancelled(Cancellation),

    /// Terminal prompt I/O failed
    #[error("prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl Error {
    /// Create an environment error for a missing tool
    pub fn environment(tool: impl Into<String>) -> Self {
        Self::Environment { tool: tool.into() }
    }

    /// Create a network error
    pub fn network(action: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            action: action.into(),
            message: message.to_string(),
        }
    }

    /// Create a template not found error
    pub fn template_not_found(template: impl Into<String>) -> Self {
        Self::TemplateNotFound {
            template: template.into(),
        }
    }

    /// Create a file system error
    pub fn file_system(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Create a manifest error
    pub fn manifest(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid project name error
    pub fn invalid_project_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProjectName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a prompt failure, treating an aborted prompt as an interrupt
    pub fn prompt(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Interrupted {
            Self::Cancelled(Cancellation::Interrupted)
        } else {
            Self::Prompt(err)
        }
    }

    /// Whether this error stems from an interrupt rather than a fault
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Cancelled(Cancellation::Interrupted))
    }

    /// Process exit status to report for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled(Cancellation::Interrupted) => 130,
            Self::Cancelled(Cancellation::Declined) => 0,
            _ => 1,
        }
    }
}

/// What happened to the project directory after a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollback {
    /// Provisioning never started, so no directory was ever owned
    NotNeeded,
    /// The directory did not exist when rollback ran
    NothingToRemove,
    /// The directory was deleted
    Removed,
    /// Deletion failed; the user has to clean up by hand
    Failed { message: String },
}

/// The single value that leaves the orchestrator when a run does not succeed
#[derive(Debug)]
pub struct Failure {
    /// Target project path, when it had been resolved
    pub path: Option<PathBuf>,
    /// States visited, ending in the state that failed (or `RolledBack`)
    pub states: Vec<ProvisioningState>,
    /// Underlying cause
    pub error: Error,
    /// Outcome of the rollback attempt
    pub rollback: Rollback,
}

impl Failure {
    /// A failure raised before any mutation took place
    pub fn before_mutation(path: Option<PathBuf>, error: Error) -> Self {
        Self {
            path,
            states: vec![ProvisioningState::NotCreated],
            error,
            rollback: Rollback::NotNeeded,
        }
    }

    /// The last state reached
    pub fn final_state(&self) -> ProvisioningState {
        self.states
            .last()
            .copied()
            .unwrap_or(ProvisioningState::NotCreated)
    }

    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        self.error.exit_code()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_external_command_message_includes_exit_details() {
        let err = Error::ExternalCommand {
            command: "npm install".to_string(),
            code: Some(1),
            stderr: "ERR! network\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command `npm install` failed with exit code 1: ERR! network"
        );
    }

    #[test]
    fn test_external_command_message_without_details() {
        let err = Error::ExternalCommand {
            command: "git commit".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "command `git commit` failed");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::Cancelled(Cancellation::Interrupted).exit_code(), 130);
        assert_eq!(Error::Cancelled(Cancellation::Declined).exit_code(), 0);
        assert_eq!(Error::NoPackageManager.exit_code(), 1);
        assert_eq!(Error::environment("git").exit_code(), 1);
    }

    #[test]
    fn test_interrupted_prompt_maps_to_cancellation() {
        let err = Error::prompt(io::Error::new(io::ErrorKind::Interrupted, "ctrl-c"));
        assert!(err.is_interrupt());

        let err = Error::prompt(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(err, Error::Prompt(_)));
    }

    #[test]
    fn test_wrapped_errors_keep_cause() {
        let err = Error::Install {
            package_manager: "pnpm".to_string(),
            source: Box::new(Error::ExternalCommand {
                command: "pnpm install".to_string(),
                code: Some(2),
                stderr: String::new(),
            }),
        };
        assert!(err.to_string().contains("pnpm install"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
