//! Charm-style CLI prompts using cliclack

use super::progress::SpinnerProgress;
use crate::config::SourceSettings;
use crate::environment::EnvironmentCapabilities;
use crate::error::{Error, Failure, Result, Rollback};
use crate::orchestrator::{Outcome, Prompter, ProvisionReport, Scaffolder};
use crate::product::ProductConfig;
use crate::project::{validate_project_name, PackageManager, ProjectRequest};
use crate::shell::SystemRunner;
use crate::templates::TemplateDescriptor;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Asks every question with cliclack widgets
#[derive(Debug, Default)]
pub struct CliclackPrompter;

impl CliclackPrompter {
    pub fn new() -> Self {
        Self
    }
}

/// Message shown under the name input when validation fails
fn name_problem(name: &str, cwd: &Path) -> Option<String> {
    match validate_project_name(name, cwd) {
        Ok(_) => None,
        Err(Error::InvalidProjectName { reason, .. }) => Some(reason),
        Err(other) => Some(other.to_string()),
    }
}

impl Prompter for CliclackPrompter {
    fn project_name(&mut self, cwd: &Path) -> Result<String> {
        let cwd = cwd.to_path_buf();
        let name: String = cliclack::input("What is the name of your project?")
            .placeholder("my-app")
            .validate(move |input: &String| match name_problem(input.trim(), &cwd) {
                Some(problem) => Err(problem),
                None => Ok(()),
            })
            .interact()
            .map_err(Error::prompt)?;
        Ok(name.trim().to_string())
    }

    fn project_type(&mut self, templates: &[TemplateDescriptor]) -> Result<TemplateDescriptor> {
        let mut select = cliclack::select("What kind of project do you want to create?");
        for (idx, template) in templates.iter().enumerate() {
            select = select.item(idx, &template.display_name, &template.description);
        }

        let selected_idx: usize = select.interact().map_err(Error::prompt)?;
        templates
            .get(selected_idx)
            .cloned()
            .ok_or_else(|| Error::template_not_found(selected_idx.to_string()))
    }

    fn package_manager(
        &mut self,
        environment: &EnvironmentCapabilities,
    ) -> Result<Option<PackageManager>> {
        let initial = environment.available_package_managers.iter().next().copied();

        loop {
            let mut select = cliclack::select("Which package manager do you want to use?");
            for pm in PackageManager::ALL {
                let hint = if environment.has_package_manager(pm) {
                    ""
                } else {
                    "not available"
                };
                select = select.item(Some(pm), pm.program(), hint);
            }
            select = select
                .item(None, "skip", "do not install dependencies")
                .initial_value(initial);

            let choice: Option<PackageManager> = select.interact().map_err(Error::prompt)?;
            match choice {
                Some(pm) if !environment.has_package_manager(pm) => {
                    cliclack::log::warning(format!("{} is not available on this machine", pm))
                        .map_err(Error::prompt)?;
                }
                choice => return Ok(choice),
            }
        }
    }

    fn init_version_control(&mut self, environment: &EnvironmentCapabilities) -> Result<bool> {
        if environment.version_control_identity.is_none() {
            cliclack::log::warning(
                "git user.name or user.email is not set; the project will have no author",
            )
            .map_err(Error::prompt)?;
        }

        cliclack::confirm("Initialize a git repository?")
            .initial_value(true)
            .interact()
            .map_err(Error::prompt)
    }

    fn confirm(
        &mut self,
        request: &ProjectRequest,
        template: &TemplateDescriptor,
    ) -> Result<bool> {
        cliclack::note(format!("Template: {}", template.label()), request.summary())
            .map_err(Error::prompt)?;

        cliclack::confirm("Proceed?")
            .initial_value(true)
            .interact()
            .map_err(Error::prompt)
    }
}

/// Run the CLI with interactive prompts
///
/// Setup problems (unreadable environment overrides, no working directory)
/// are returned as errors. Everything that happens once prompting starts is
/// reported on screen and mapped to the returned exit code.
pub async fn run<C: ProductConfig>(
    config: &C,
    cancel: CancellationToken,
    cli_version: &str,
) -> anyhow::Result<ExitCode> {
    cliclack::intro(format!("{} v{}", config.display_name(), cli_version))?;

    let settings = SourceSettings::from_env(config)?;
    match &settings.local_dir {
        Some(dir) => {
            cliclack::log::info(format!("Using local templates from {}", dir.display()))?
        }
        None => cliclack::log::info(format!(
            "Using templates from github.com/{} ({})",
            settings.owner, settings.medium
        ))?,
    }

    let cwd = std::env::current_dir().context("Failed to resolve the current directory")?;
    let runner = SystemRunner;
    let progress = SpinnerProgress::new();
    let scaffolder = Scaffolder::for_product(
        config,
        settings.fetcher(config.user_agent()),
        &runner,
        &progress,
        cancel,
        cwd,
    );

    let mut prompter = CliclackPrompter::new();
    match scaffolder.run(&mut prompter).await {
        Ok(Outcome::Created(report)) => {
            print_next_steps(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(Outcome::Declined) => {
            cliclack::outro_cancel("Nothing was created")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            report_failure(&failure)?;
            Ok(ExitCode::from(failure.exit_code()))
        }
    }
}

fn report_failure(failure: &Failure) -> anyhow::Result<()> {
    if !failure.error.is_interrupt() {
        cliclack::log::error(failure.error.to_string())?;
    }

    let path = failure
        .path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    match &failure.rollback {
        Rollback::Removed => cliclack::log::warning(format!("Removed {}", path))?,
        Rollback::Failed { message } => cliclack::log::warning(format!(
            "Could not remove {} ({}); please delete it manually",
            path, message
        ))?,
        Rollback::NotNeeded | Rollback::NothingToRemove => {}
    }

    if failure.error.is_interrupt() {
        cliclack::outro_cancel("Operation cancelled")?;
    } else {
        cliclack::outro_cancel(format!("{}", "Project was not created".red()))?;
    }
    Ok(())
}

fn print_next_steps(report: &ProvisionReport) -> anyhow::Result<()> {
    let request = &report.request;
    let pm = request.package_manager();

    let mut steps = vec![format!("cd {}", request.name())];
    if !request.install_packages() {
        steps.push(format!("{} install", pm));
    }
    steps.push(format!("{} run dev", pm));

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }

    cliclack::outro(format!(
        "Created {} in {}",
        request.project_type().to_string().green(),
        report.path.display()
    ))?;

    Ok(())
}
