//! ts-new Core - Provisioning TypeScript projects from templates
//!
//! The library turns a set of user decisions into a ready-to-use project
//! directory: the template is fetched and copied, its manifest rewritten,
//! dependencies installed and a git repository initialized. Any failure after
//! the directory appears removes it again.
//!
//! # Architecture
//!
//! - **Layer 1: Core Operations** - environment probing, template fetching and
//!   copying, manifest customization, installation
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` and the
//!   [`Scaffolder`] state machine, driven by any [`Prompter`]
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use ts_new_core::{Scaffolder, SilentProgress, SystemRunner, TemplateFetcher};
//! use tokio_util::sync::CancellationToken;
//!
//! let fetcher = TemplateFetcher::from_local("templates".into(), "my-tool");
//! let scaffolder = Scaffolder::new(
//!     fetcher,
//!     &SystemRunner,
//!     &SilentProgress,
//!     CancellationToken::new(),
//!     std::env::current_dir()?,
//! );
//! let outcome = scaffolder.run(&mut my_prompter).await;
//! ```

pub mod cancel;
pub mod config;
pub mod customizer;
pub mod environment;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod orchestrator;
pub mod product;
pub mod progress;
pub mod project;
pub mod shell;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use config::SourceSettings;
pub use environment::{EnvironmentCapabilities, VersionControlIdentity};
pub use error::{Cancellation, Error, Failure, Result, Rollback};
pub use orchestrator::{
    Outcome, Prompter, ProvisionPlan, ProvisionReport, ProvisioningState, Scaffolder,
};
pub use product::ProductConfig;
pub use progress::{EntryKind, Progress, SilentProgress};
pub use project::{PackageManager, ProjectRequest, ProjectType};
pub use shell::{CommandRunner, SystemRunner};
pub use templates::{TemplateDescriptor, TemplateFetcher, TemplateMedium, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;
