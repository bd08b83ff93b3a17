//! Post-copy adjustments that turn a template into the user's project

use crate::environment::EnvironmentCapabilities;
use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use crate::project::{PackageManager, ProjectRequest};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Files that only make sense in the template's own repository
pub const SCAFFOLD_ONLY_FILES: &[&str] = &[
    ".github/dependabot.yml",
    "readme.md",
    "README.md",
    "LICENSE",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "sonar-project.properties",
];

/// Git hook scripts that invoke local binaries
pub const HOOK_FILES: &[&str] = &[".husky/pre-commit", ".husky/commit-msg"];

/// Fields that describe the template repository, not the new project
const TEMPLATE_ONLY_FIELDS: &[&str] = &["repository", "keywords"];

/// How the templates invoke local binaries in hooks, longest form first.
///
/// `--no --` stops npx from installing missing packages and has no
/// equivalent in the other managers, so it goes with the prefix.
const TEMPLATE_EXEC_FORMS: &[&str] = &["npx --no -- ", "npx "];

/// Apply every customization step to a freshly materialized project.
///
/// Any failure is wrapped in [`Error::Customization`]; partial edits are left
/// for the orchestrator's rollback to discard.
pub async fn customize(
    project_root: &Path,
    request: &ProjectRequest,
    environment: &EnvironmentCapabilities,
) -> Result<()> {
    customize_inner(project_root, request, environment)
        .await
        .map_err(|source| Error::Customization {
            source: Box::new(source),
        })
}

async fn customize_inner(
    project_root: &Path,
    request: &ProjectRequest,
    environment: &EnvironmentCapabilities,
) -> Result<()> {
    remove_scaffold_files(project_root).await?;
    rewrite_manifest(project_root, request, environment).await?;
    if request.init_version_control() {
        rewrite_hooks(project_root, request.package_manager()).await?;
    }
    Ok(())
}

/// Remove scaffold-only files; missing files are skipped
pub async fn remove_scaffold_files(project_root: &Path) -> Result<()> {
    for relative in SCAFFOLD_ONLY_FILES {
        let path = project_root.join(relative);
        let present = fs::try_exists(&path)
            .await
            .map_err(|e| Error::file_system("inspect", &path, e))?;
        if !present {
            continue;
        }
        fs::remove_file(&path)
            .await
            .map_err(|e| Error::file_system("remove", &path, e))?;
        debug!(file = relative, "removed scaffold file");
    }
    Ok(())
}

/// The `author` value to write, if any
fn author_for(
    request: &ProjectRequest,
    environment: &EnvironmentCapabilities,
) -> Option<String> {
    if !request.init_version_control() {
        return None;
    }
    environment
        .version_control_identity
        .as_ref()
        .map(ToString::to_string)
}

/// Rewrite `package.json` for the new project
pub async fn rewrite_manifest(
    project_root: &Path,
    request: &ProjectRequest,
    environment: &EnvironmentCapabilities,
) -> Result<()> {
    let mut manifest = PackageManifest::load(project_root).await?;
    apply_manifest_fields(&mut manifest, request, environment)?;
    manifest.save().await
}

fn apply_manifest_fields(
    manifest: &mut PackageManifest,
    request: &ProjectRequest,
    environment: &EnvironmentCapabilities,
) -> Result<()> {
    manifest.set("name", request.name())?;
    manifest.set("description", request.name())?;

    match author_for(request, environment) {
        Some(author) => manifest.set("author", author)?,
        None => manifest.delete("author"),
    }

    for field in TEMPLATE_ONLY_FIELDS {
        manifest.delete(field);
    }

    for (field, value) in request.project_type().manifest_fields() {
        manifest.set(field, *value)?;
    }
    if request.init_version_control() {
        manifest.set("scripts.prepare", "husky")?;
    }

    Ok(())
}

/// Point hook scripts at the chosen package manager
pub async fn rewrite_hooks(project_root: &Path, package_manager: PackageManager) -> Result<()> {
    if package_manager == PackageManager::Npm {
        return Ok(());
    }
    for relative in HOOK_FILES {
        let path = project_root.join(relative);
        let present = fs::try_exists(&path)
            .await
            .map_err(|e| Error::file_system("inspect", &path, e))?;
        if !present {
            continue;
        }
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::file_system("read", &path, e))?;
        let rewritten = rewrite_hook(&content, package_manager);
        if rewritten != content {
            fs::write(&path, rewritten)
                .await
                .map_err(|e| Error::file_system("write", &path, e))?;
            debug!(hook = relative, %package_manager, "rewrote hook");
        }
    }
    Ok(())
}

/// Swap every npx invocation in a hook script for the manager's own runner
fn rewrite_hook(script: &str, package_manager: PackageManager) -> String {
    let replacement = format!("{} ", package_manager.exec_prefix());
    TEMPLATE_EXEC_FORMS
        .iter()
        .fold(script.to_string(), |text, form| text.replace(form, &replacement))
}
