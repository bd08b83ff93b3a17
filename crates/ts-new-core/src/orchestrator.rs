//! Provisioning orchestrator
//!
//! A run has two halves. Planning collects every user decision through a
//! [`Prompter`] and touches nothing on disk. Provisioning then drives the
//! side-effecting steps against a single new directory:
//!
//! ```text
//! NotCreated -> Materializing -> Customizing -> InstallingDependencies
//!            -> VersionControlInit -> Complete
//! ```
//!
//! Any failure or interrupt after `Materializing` has been entered ends in
//! `RolledBack`. The directory is deleted only if this run created it.

use crate::cancel::{check, OrCancelExt};
use crate::customizer;
use crate::environment::{self, EnvironmentCapabilities};
use crate::error::{Cancellation, Error, Failure, Result, Rollback};
use crate::installer;
use crate::product::ProductConfig;
use crate::progress::{EntryKind, Progress};
use crate::project::{validate_project_name, PackageManager, ProjectRequest};
use crate::shell::CommandRunner;
use crate::templates::{materialize, TemplateDescriptor, TemplateFetcher};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const STAGING_PREFIX: &str = ".ts-new-staging-";

/// Lifecycle of the target directory during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    NotCreated,
    Materializing,
    Customizing,
    InstallingDependencies,
    VersionControlInit,
    Complete,
    RolledBack,
}

impl ProvisioningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningState::NotCreated => "not created",
            ProvisioningState::Materializing => "materializing",
            ProvisioningState::Customizing => "customizing",
            ProvisioningState::InstallingDependencies => "installing dependencies",
            ProvisioningState::VersionControlInit => "initializing version control",
            ProvisioningState::Complete => "complete",
            ProvisioningState::RolledBack => "rolled back",
        }
    }

    /// Whether the run owns an on-disk directory in this state
    pub fn owns_directory(&self) -> bool {
        !matches!(
            self,
            ProvisioningState::NotCreated
                | ProvisioningState::Complete
                | ProvisioningState::RolledBack
        )
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collects user decisions before anything is written.
///
/// Implementations return [`Error::Cancelled`] when the user aborts a prompt.
pub trait Prompter {
    /// Name of the project directory, relative to `cwd`
    fn project_name(&mut self, cwd: &Path) -> Result<String>;

    /// Pick one of the available templates
    fn project_type(&mut self, templates: &[TemplateDescriptor]) -> Result<TemplateDescriptor>;

    /// Package manager to install with; `None` skips installation
    fn package_manager(
        &mut self,
        environment: &EnvironmentCapabilities,
    ) -> Result<Option<PackageManager>>;

    /// Whether to initialize a git repository. Only asked when git is available.
    fn init_version_control(&mut self, environment: &EnvironmentCapabilities) -> Result<bool>;

    /// Final go/no-go on the summarized request
    fn confirm(&mut self, request: &ProjectRequest, template: &TemplateDescriptor)
        -> Result<bool>;
}

/// Everything decided during planning
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    pub request: ProjectRequest,
    pub environment: EnvironmentCapabilities,
    pub template: TemplateDescriptor,
}

/// A successfully provisioned project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub path: PathBuf,
    pub request: ProjectRequest,
    /// States visited, ending in `Complete`
    pub states: Vec<ProvisioningState>,
    /// Relative paths copied from the template
    pub files: Vec<PathBuf>,
}

/// How a run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(ProvisionReport),
    /// The user said no at the confirmation prompt; nothing was written
    Declined,
}

/// Drives planning and provisioning for one run
pub struct Scaffolder<'a> {
    fetcher: TemplateFetcher,
    runner: &'a dyn CommandRunner,
    progress: &'a dyn Progress,
    cancel: CancellationToken,
    cwd: PathBuf,
    commit_message: String,
}

impl<'a> Scaffolder<'a> {
    pub fn new(
        fetcher: TemplateFetcher,
        runner: &'a dyn CommandRunner,
        progress: &'a dyn Progress,
        cancel: CancellationToken,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            runner,
            progress,
            cancel,
            cwd: cwd.into(),
            commit_message: "chore: initial commit".to_string(),
        }
    }

    /// Scaffolder using the product's commit message
    pub fn for_product<C: ProductConfig>(
        config: &C,
        fetcher: TemplateFetcher,
        runner: &'a dyn CommandRunner,
        progress: &'a dyn Progress,
        cancel: CancellationToken,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self::new(fetcher, runner, progress, cancel, cwd)
            .with_commit_message(config.initial_commit_message())
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    /// Plan with `prompter`, then provision if the user confirms
    pub async fn run(
        &self,
        prompter: &mut dyn Prompter,
    ) -> std::result::Result<Outcome, Failure> {
        let plan = match self.plan(prompter).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                info!("confirmation declined; nothing created");
                return Ok(Outcome::Declined);
            }
            Err(error) => return Err(Failure::before_mutation(None, error)),
        };
        self.provision(&plan).await.map(Outcome::Created)
    }

    /// Collect every decision. Returns `None` when the user declines.
    ///
    /// Nothing is written to disk here.
    pub async fn plan(&self, prompter: &mut dyn Prompter) -> Result<Option<ProvisionPlan>> {
        check(&self.cancel)?;
        let name = prompter.project_name(&self.cwd)?;
        validate_project_name(&name, &self.cwd)?;

        let environment = self
            .step(
                "Checking environment",
                "Environment checked",
                environment::probe(self.runner),
            )
            .await?;
        if self.fetcher.requires_git() && !environment.version_control_available {
            return Err(Error::environment("git"));
        }

        let templates = self
            .step(
                "Loading templates",
                "Templates loaded",
                self.fetcher.list_templates(),
            )
            .await?;
        if templates.is_empty() {
            return Err(Error::network(
                "list templates",
                "the template source offers no templates",
            ));
        }

        let template = prompter.project_type(&templates)?;
        check(&self.cancel)?;

        let package_manager = prompter.package_manager(&environment)?;
        if let Some(pm) = package_manager {
            if !environment.has_package_manager(pm) {
                return Err(Error::environment(pm.program()));
            }
        }
        check(&self.cancel)?;

        let init_version_control = if environment.version_control_available {
            prompter.init_version_control(&environment)?
        } else {
            self.progress
                .warn("git not found; the project will not be a git repository");
            false
        };
        check(&self.cancel)?;

        let request = ProjectRequest::new(
            &name,
            &self.cwd,
            template.project_type,
            package_manager,
            init_version_control,
        )?;

        if !prompter.confirm(&request, &template)? {
            return Ok(None);
        }
        check(&self.cancel)?;

        Ok(Some(ProvisionPlan {
            request,
            environment,
            template,
        }))
    }

    /// Run the side-effecting steps, rolling back on failure or interrupt
    pub async fn provision(
        &self,
        plan: &ProvisionPlan,
    ) -> std::result::Result<ProvisionReport, Failure> {
        let path = plan.request.path().to_path_buf();
        let mut states = vec![ProvisioningState::NotCreated];
        let mut claimed = false;

        match self.provision_steps(plan, &mut states, &mut claimed).await {
            Ok(files) => {
                states.push(ProvisioningState::Complete);
                info!(path = %path.display(), "project created");
                Ok(ProvisionReport {
                    path,
                    request: plan.request.clone(),
                    states,
                    files,
                })
            }
            Err(error) => {
                // A child killed by the same Ctrl+C may report its own failure first
                let error = if self.cancel.is_cancelled() {
                    Error::Cancelled(Cancellation::Interrupted)
                } else {
                    error
                };
                let failed_in = states
                    .last()
                    .copied()
                    .unwrap_or(ProvisioningState::NotCreated);
                debug!(state = %failed_in, %error, "provisioning failed");

                let rollback = if claimed {
                    rollback(&path).await
                } else {
                    Rollback::NotNeeded
                };
                if states.iter().any(ProvisioningState::owns_directory) {
                    states.push(ProvisioningState::RolledBack);
                }

                Err(Failure {
                    path: Some(path),
                    states,
                    error,
                    rollback,
                })
            }
        }
    }

    async fn provision_steps(
        &self,
        plan: &ProvisionPlan,
        states: &mut Vec<ProvisioningState>,
        claimed: &mut bool,
    ) -> Result<Vec<PathBuf>> {
        let request = &plan.request;
        let root = request.path();

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir()
            .map_err(|e| Error::file_system("create", std::env::temp_dir(), e))?;

        enter(states, ProvisioningState::Materializing);
        let layers = self
            .step(
                "Fetching template",
                "Template fetched",
                self.fetcher.stage(self.runner, &plan.template, staging.path()),
            )
            .await?;
        let files = self
            .step(
                "Copying template files",
                "Template files copied",
                async {
                    claim(request, self.progress).await?;
                    *claimed = true;
                    materialize(&layers, root, request.project_type(), self.progress).await
                },
            )
            .await?;

        enter(states, ProvisioningState::Customizing);
        self.step(
            "Customizing project",
            "Project customized",
            customizer::customize(root, request, &plan.environment),
        )
        .await?;

        if request.install_packages() {
            enter(states, ProvisioningState::InstallingDependencies);
            let pm = request.package_manager();
            self.step(
                &format!("Installing dependencies with {}", pm),
                "Dependencies installed",
                installer::install(self.runner, root, pm),
            )
            .await?;
        }

        if request.init_version_control() {
            enter(states, ProvisioningState::VersionControlInit);
            self.step(
                "Initializing git repository",
                "Git repository initialized",
                async {
                    installer::init_repository(self.runner, root).await?;
                    installer::commit_initial(self.runner, root, &self.commit_message).await
                },
            )
            .await?;
        }

        Ok(files)
    }

    /// Run one cancellable step with progress reporting
    async fn step<T, F>(&self, message: &str, done: &str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
        T: Send,
    {
        check(&self.cancel)?;
        self.progress.start(message);
        match work.or_cancel(&self.cancel).await {
            Ok(value) => {
                self.progress.succeed(done);
                Ok(value)
            }
            Err(e) => {
                self.progress.fail(message);
                Err(e)
            }
        }
    }
}

/// Create the project directory, refusing one that already exists
async fn claim(request: &ProjectRequest, progress: &dyn Progress) -> Result<()> {
    let root = request.path();
    match fs::create_dir(root).await {
        Ok(()) => {
            progress.created(EntryKind::Directory, root);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::invalid_project_name(
            request.name(),
            "a directory with this name already exists",
        )),
        Err(e) => Err(Error::file_system("create", root, e)),
    }
}

fn enter(states: &mut Vec<ProvisioningState>, state: ProvisioningState) {
    info!(%state, "entering state");
    states.push(state);
}

/// Best-effort removal of the project directory
async fn rollback(path: &Path) -> Rollback {
    match fs::try_exists(path).await {
        Ok(false) => {
            debug!(path = %path.display(), "nothing to roll back");
            Rollback::NothingToRemove
        }
        Ok(true) => match fs::remove_dir_all(path).await {
            Ok(()) => {
                info!(path = %path.display(), "rolled back project directory");
                Rollback::Removed
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "rollback failed");
                Rollback::Failed {
                    message: e.to_string(),
                }
            }
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "rollback could not inspect directory");
            Rollback::Failed {
                message: e.to_string(),
            }
        }
    }
}
