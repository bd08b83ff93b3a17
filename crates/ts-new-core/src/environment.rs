//! Local tool detection for git and package managers

use crate::error::{Error, Result};
use crate::project::PackageManager;
use crate::shell::{CommandRunner, CommandSpec};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Author identity from git configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionControlIdentity {
    pub name: String,
    pub email: String,
}

impl fmt::Display for VersionControlIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Tooling found on this machine; computed once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentCapabilities {
    pub version_control_available: bool,
    pub version_control_identity: Option<VersionControlIdentity>,
    pub available_package_managers: BTreeSet<PackageManager>,
}

impl EnvironmentCapabilities {
    pub fn has_package_manager(&self, pm: PackageManager) -> bool {
        self.available_package_managers.contains(&pm)
    }
}

/// Ask whether `program --version` succeeds
async fn responds(runner: &dyn CommandRunner, program: &str) -> bool {
    match runner.run(&CommandSpec::new(program, ["--version"])).await {
        Ok(out) => {
            debug!(program, version = out.trimmed(), "tool available");
            true
        }
        Err(e) => {
            debug!(program, error = %e, "tool unavailable");
            false
        }
    }
}

/// Read a git config value, treating errors and empty values as absent
async fn git_config(runner: &dyn CommandRunner, key: &str) -> Option<String> {
    match runner.run(&CommandSpec::new("git", ["config", key])).await {
        Ok(out) if !out.trimmed().is_empty() => Some(out.trimmed().to_string()),
        Ok(_) => None,
        Err(e) => {
            debug!(key, error = %e, "git config lookup failed");
            None
        }
    }
}

async fn probe_identity(runner: &dyn CommandRunner) -> Option<VersionControlIdentity> {
    let (name, email) = tokio::join!(
        git_config(runner, "user.name"),
        git_config(runner, "user.email")
    );
    Some(VersionControlIdentity {
        name: name?,
        email: email?,
    })
}

/// Probe for git, the git identity, and every known package manager.
///
/// Each check is independent and absorbs its own failure. The probe as a
/// whole only fails when no package manager at all is usable.
pub async fn probe(runner: &dyn CommandRunner) -> Result<EnvironmentCapabilities> {
    let (git, identity, npm, yarn, pnpm) = tokio::join!(
        responds(runner, "git"),
        probe_identity(runner),
        responds(runner, PackageManager::Npm.program()),
        responds(runner, PackageManager::Yarn.program()),
        responds(runner, PackageManager::Pnpm.program()),
    );

    let available_package_managers: BTreeSet<_> = [
        (PackageManager::Npm, npm),
        (PackageManager::Yarn, yarn),
        (PackageManager::Pnpm, pnpm),
    ]
    .into_iter()
    .filter_map(|(pm, ok)| ok.then_some(pm))
    .collect();

    if available_package_managers.is_empty() {
        return Err(Error::NoPackageManager);
    }

    if !git {
        debug!("git not found; version control init will be unavailable");
    }

    Ok(EnvironmentCapabilities {
        version_control_available: git,
        version_control_identity: if git { identity } else { None },
        available_package_managers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeRunner;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_probe_collects_available_tools() {
        let runner = FakeRunner::new()
            .with_output("git config user.name", "Jane Doe\n")
            .with_output("git config user.email", "jane@example.com\n")
            .failing("yarn --version");

        let env = probe(&runner).await.unwrap();

        assert!(env.version_control_available);
        assert_eq!(
            env.version_control_identity,
            Some(VersionControlIdentity {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
            })
        );
        assert_eq!(
            env.available_package_managers.into_iter().collect::<Vec<_>>(),
            vec![PackageManager::Npm, PackageManager::Pnpm]
        );
    }

    #[tokio::test]
    async fn test_identity_requires_name_and_email() {
        let runner = FakeRunner::new()
            .with_output("git config user.name", "Jane Doe\n")
            .with_output("git config user.email", "  \n");

        let env = probe(&runner).await.unwrap();
        assert!(env.version_control_available);
        assert_eq!(env.version_control_identity, None);
    }

    #[tokio::test]
    async fn test_missing_git_is_not_fatal() {
        let runner = FakeRunner::new()
            .failing("git --version")
            .with_output("git config user.name", "Jane Doe")
            .with_output("git config user.email", "jane@example.com");

        let env = probe(&runner).await.unwrap();
        assert!(!env.version_control_available);
        assert_eq!(env.version_control_identity, None);
        assert!(env.has_package_manager(PackageManager::Npm));
    }

    #[tokio::test]
    async fn test_no_package_manager_is_fatal() {
        let runner = FakeRunner::new()
            .failing("npm --version")
            .failing("yarn --version")
            .failing("pnpm --version");

        let err = probe(&runner).await.unwrap_err();
        assert!(matches!(err, Error::NoPackageManager));
    }

    #[test]
    fn test_identity_display() {
        let identity = VersionControlIdentity {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
        };
        assert_eq!(identity.to_string(), "Jane Doe <jane@example.com>");
    }
}
