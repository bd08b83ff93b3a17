//! Project request types: project types, package managers, and the
//! confirmed set of user decisions

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported project types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectType {
    /// Plain script runtime
    Node,
    /// Server framework
    Nest,
    /// Bundler-based app
    Vite,
    /// Full-stack framework
    Next,
}

impl ProjectType {
    pub const ALL: [ProjectType; 4] = [
        ProjectType::Node,
        ProjectType::Nest,
        ProjectType::Vite,
        ProjectType::Next,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Node => "node",
            ProjectType::Nest => "nest",
            ProjectType::Vite => "vite",
            ProjectType::Next => "next",
        }
    }

    /// Template entries this project type never receives
    pub fn excluded_entries(&self) -> &'static [&'static str] {
        match self {
            ProjectType::Vite => &["vitest.config.mts"],
            ProjectType::Next => &[".swcrc"],
            ProjectType::Node | ProjectType::Nest => &[],
        }
    }

    /// Whether a template entry with this file name is skipped
    pub fn excludes(&self, file_name: &str) -> bool {
        self.excluded_entries().contains(&file_name)
    }

    /// Manifest scripts (and top-level fields) written for this type
    pub fn manifest_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ProjectType::Node => &[
                (
                    "scripts.dev",
                    "node --watch -r @swc-node/register src/index.ts",
                ),
                (
                    "scripts.build",
                    "rm -rf dist && swc src -d dist --ignore **/*.spec.ts --strip-leading-paths",
                ),
                ("type", "module"),
            ],
            ProjectType::Nest => &[
                ("scripts.dev", "node --watch -r @swc-node/register src/main.ts"),
                ("scripts.build", "rm -rf dist && nest build"),
                ("scripts.start", "node dist/main"),
            ],
            ProjectType::Vite => &[
                ("scripts.dev", "vite"),
                ("scripts.build", "vite build"),
                ("scripts.start", "vite preview"),
            ],
            ProjectType::Next => &[
                ("scripts.dev", "next dev"),
                ("scripts.build", "next build"),
                ("scripts.start", "next start"),
            ],
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" => Ok(ProjectType::Node),
            "nest" => Ok(ProjectType::Nest),
            "vite" => Ok(ProjectType::Vite),
            "next" => Ok(ProjectType::Next),
            other => Err(format!("unknown project type: {}", other)),
        }
    }
}

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub const ALL: [PackageManager; 3] =
        [PackageManager::Npm, PackageManager::Yarn, PackageManager::Pnpm];

    /// Used when dependencies are not installed; never executed
    pub const NO_INSTALL_DEFAULT: PackageManager = PackageManager::Npm;

    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    pub fn install_args(&self) -> &'static [&'static str] {
        &["install"]
    }

    /// How a locally installed binary is invoked (e.g. from git hooks)
    pub fn exec_prefix(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npx",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm exec",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "pnpm" => Ok(PackageManager::Pnpm),
            other => Err(format!("unknown package manager: {}", other)),
        }
    }
}

/// Check that `name` is a safe directory name that does not exist under `cwd`.
///
/// Returns the absolute project path.
pub fn validate_project_name(name: &str, cwd: &Path) -> Result<PathBuf> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if !starts_with_letter || !rest_valid {
        return Err(Error::invalid_project_name(
            name,
            "please enter a valid directory name for your project",
        ));
    }

    let path = cwd.join(name);
    let exists = path
        .try_exists()
        .map_err(|e| Error::file_system("inspect", &path, e))?;
    if exists {
        return Err(Error::invalid_project_name(
            name,
            "a directory with this name already exists",
        ));
    }

    Ok(path)
}

/// The confirmed set of user decisions for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    name: String,
    path: PathBuf,
    project_type: ProjectType,
    package_manager: PackageManager,
    install_packages: bool,
    init_version_control: bool,
}

impl ProjectRequest {
    /// Build a request, validating the name against `cwd`.
    ///
    /// `package_manager: None` means dependencies are not installed.
    pub fn new(
        name: &str,
        cwd: &Path,
        project_type: ProjectType,
        package_manager: Option<PackageManager>,
        init_version_control: bool,
    ) -> Result<Self> {
        let path = validate_project_name(name, cwd)?;
        Ok(Self {
            name: name.to_string(),
            path,
            project_type,
            package_manager: package_manager.unwrap_or(PackageManager::NO_INSTALL_DEFAULT),
            install_packages: package_manager.is_some(),
            init_version_control,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute project directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    pub fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    pub fn install_packages(&self) -> bool {
        self.install_packages
    }

    pub fn init_version_control(&self) -> bool {
        self.init_version_control
    }

    /// One-line description shown before the final confirmation
    pub fn summary(&self) -> String {
        let install = if self.install_packages {
            format!("dependencies will be installed using {}", self.package_manager)
        } else {
            "dependencies will not be installed".to_string()
        };
        let git = if self.init_version_control {
            ""
        } else {
            "not "
        };
        format!(
            "This will create a {} project in ./{}, {} and a git repository will {}be initialized.",
            self.project_type, self.name, install, git
        )
    }
}
