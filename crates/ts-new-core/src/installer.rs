//! Dependency installation and repository setup for a generated project

use crate::error::{Error, Result};
use crate::project::PackageManager;
use crate::shell::{CommandRunner, CommandSpec};
use std::path::Path;
use tracing::info;

/// Install dependencies with `package_manager` inside `project_root`
pub async fn install(
    runner: &dyn CommandRunner,
    project_root: &Path,
    package_manager: PackageManager,
) -> Result<()> {
    info!(%package_manager, "installing dependencies");
    let args = package_manager.install_args().iter().copied();
    let spec = CommandSpec::new(package_manager.program(), args)
        .current_dir(project_root)
        .suppressed();
    runner
        .run(&spec)
        .await
        .map(|_| ())
        .map_err(|source| Error::Install {
            package_manager: package_manager.to_string(),
            source: Box::new(source),
        })
}

/// `git init` in `project_root`
pub async fn init_repository(runner: &dyn CommandRunner, project_root: &Path) -> Result<()> {
    info!(path = %project_root.display(), "initializing git repository");
    git(runner, project_root, &["init"]).await
}

/// Stage everything and record the first commit
pub async fn commit_initial(
    runner: &dyn CommandRunner,
    project_root: &Path,
    message: &str,
) -> Result<()> {
    git(runner, project_root, &["add", "."]).await?;
    git(runner, project_root, &["commit", "-m", message]).await
}

async fn git(runner: &dyn CommandRunner, project_root: &Path, args: &[&str]) -> Result<()> {
    let spec = CommandSpec::new("git", args.iter().copied())
        .current_dir(project_root)
        .suppressed();
    runner.run(&spec).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeRunner;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_install_runs_in_project_root() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new();

        install(&runner, dir.path(), PackageManager::Pnpm).await.unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].command_line(), "pnpm install");
        assert_eq!(commands[0].cwd, Some(dir.path().to_path_buf()));
    }

    #[tokio::test]
    async fn test_install_failure_names_package_manager() {
        let runner = FakeRunner::new().failing("yarn install");

        let err = install(&runner, &PathBuf::from("/tmp/app"), PackageManager::Yarn)
            .await
            .unwrap_err();

        match err {
            Error::Install {
                package_manager,
                source,
            } => {
                assert_eq!(package_manager, "yarn");
                assert!(matches!(*source, Error::ExternalCommand { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_repository_setup_sequence() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new();

        init_repository(&runner, dir.path()).await.unwrap();
        commit_initial(&runner, dir.path(), "chore: initial commit")
            .await
            .unwrap();

        assert_eq!(
            runner.command_lines(),
            vec!["git init", "git add .", "git commit -m chore: initial commit"]
        );
        assert!(dir.path().join(".git").is_dir());
    }

    #[tokio::test]
    async fn test_commit_stops_when_add_fails() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new().failing("git add .");

        let err = commit_initial(&runner, dir.path(), "chore: initial commit")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ExternalCommand { .. }));
        assert_eq!(runner.command_lines(), vec!["git add ."]);
    }
}
