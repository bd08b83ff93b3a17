//! Test doubles shared by the unit tests

use crate::environment::EnvironmentCapabilities;
use crate::error::{Error, Result};
use crate::orchestrator::Prompter;
use crate::product::ProductConfig;
use crate::progress::{EntryKind, Progress};
use crate::project::{PackageManager, ProjectRequest, ProjectType};
use crate::shell::{CommandOutput, CommandRunner, CommandSpec};
use crate::templates::TemplateDescriptor;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Write `files` (relative path, content) under `root`, creating directories
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
}

#[derive(Clone)]
pub struct TestProduct;

impl ProductConfig for TestProduct {
    fn name(&self) -> &'static str {
        "ts-new"
    }

    fn display_name(&self) -> &'static str {
        "ts-new"
    }

    fn template_owner(&self) -> &'static str {
        "mkvlrn"
    }

    fn env_prefix(&self) -> &'static str {
        "TS_NEW"
    }
}

/// Records commands and answers from a script.
///
/// Unscripted commands succeed with empty output. `git init` creates `.git/`
/// in the working directory like the real thing.
#[derive(Default)]
pub struct FakeRunner {
    outputs: HashMap<String, String>,
    failures: HashSet<String>,
    failing_programs: HashSet<String>,
    cancel_on: Option<(String, CancellationToken)>,
    commands: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command_line` with `stdout`
    pub fn with_output(mut self, command_line: &str, stdout: &str) -> Self {
        self.outputs
            .insert(command_line.to_string(), stdout.to_string());
        self
    }

    /// Make `command_line` exit with status 1
    pub fn failing(mut self, command_line: &str) -> Self {
        self.failures.insert(command_line.to_string());
        self
    }

    /// Make every invocation of `program` fail
    pub fn failing_program(mut self, program: &str) -> Self {
        self.failing_programs.insert(program.to_string());
        self
    }

    /// Cancel `token` when `command_line` runs; the command itself succeeds
    pub fn cancelling_on(mut self, command_line: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((command_line.to_string(), token));
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(CommandSpec::command_line)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let line = spec.command_line();
        self.commands.lock().unwrap().push(spec.clone());

        if let Some((trigger, token)) = &self.cancel_on {
            if *trigger == line {
                token.cancel();
            }
        }

        if self.failures.contains(&line) || self.failing_programs.contains(&spec.program) {
            return Err(Error::ExternalCommand {
                command: line,
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }

        if line == "git init" {
            if let Some(cwd) = &spec.cwd {
                std::fs::create_dir_all(cwd.join(".git")).unwrap();
            }
        }

        if spec.program == "git" && spec.args.first().map(String::as_str) == Some("clone") {
            if let Some(checkout) = spec.args.last() {
                write_tree(
                    Path::new(checkout),
                    &[(".git/HEAD", "ref: refs/heads/main\n"), ("package.json", "{}")],
                );
            }
        }

        Ok(CommandOutput {
            stdout: self.outputs.get(&line).cloned().unwrap_or_default(),
            stderr: String::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start(String),
    Succeed(String),
    Fail(String),
    Warn(String),
    Created(EntryKind, PathBuf),
}

/// Keeps every progress event for later inspection
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn created_paths(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Created(_, path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Warn(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Progress for RecordingProgress {
    fn start(&self, message: &str) {
        self.push(ProgressEvent::Start(message.to_string()));
    }

    fn succeed(&self, message: &str) {
        self.push(ProgressEvent::Succeed(message.to_string()));
    }

    fn fail(&self, message: &str) {
        self.push(ProgressEvent::Fail(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(ProgressEvent::Warn(message.to_string()));
    }

    fn created(&self, kind: EntryKind, path: &Path) {
        self.push(ProgressEvent::Created(kind, path.to_path_buf()));
    }
}

/// Answers every prompt from fixed values
pub struct ScriptedPrompter {
    name: String,
    project_type: ProjectType,
    package_manager: Option<PackageManager>,
    version_control: bool,
    confirm: bool,
    asked_version_control: bool,
}

impl ScriptedPrompter {
    /// Installs with npm, initializes git, and confirms
    pub fn new(name: &str, project_type: ProjectType) -> Self {
        Self {
            name: name.to_string(),
            project_type,
            package_manager: Some(PackageManager::Npm),
            version_control: true,
            confirm: true,
            asked_version_control: false,
        }
    }

    pub fn with_package_manager(mut self, package_manager: Option<PackageManager>) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn with_version_control(mut self, init: bool) -> Self {
        self.version_control = init;
        self
    }

    pub fn declining(mut self) -> Self {
        self.confirm = false;
        self
    }

    pub fn asked_version_control(&self) -> bool {
        self.asked_version_control
    }
}

impl Prompter for ScriptedPrompter {
    fn project_name(&mut self, _cwd: &Path) -> Result<String> {
        Ok(self.name.clone())
    }

    fn project_type(&mut self, templates: &[TemplateDescriptor]) -> Result<TemplateDescriptor> {
        templates
            .iter()
            .find(|t| t.project_type == self.project_type)
            .cloned()
            .ok_or_else(|| Error::template_not_found(self.project_type.as_str()))
    }

    fn package_manager(
        &mut self,
        _environment: &EnvironmentCapabilities,
    ) -> Result<Option<PackageManager>> {
        Ok(self.package_manager)
    }

    fn init_version_control(&mut self, _environment: &EnvironmentCapabilities) -> Result<bool> {
        self.asked_version_control = true;
        Ok(self.version_control)
    }

    fn confirm(
        &mut self,
        _request: &ProjectRequest,
        _template: &TemplateDescriptor,
    ) -> Result<bool> {
        Ok(self.confirm)
    }
}
