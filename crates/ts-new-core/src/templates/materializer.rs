//! Template tree copying with per-project-type rename and skip rules

use crate::error::{Error, Result};
use crate::progress::{EntryKind, Progress};
use crate::project::ProjectType;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Suffix marking template-only placeholders (e.g. `.gitignore.example`)
const EXAMPLE_SUFFIX: &str = ".example";

/// Name a template file receives in the generated project
pub fn destination_name(file_name: &str) -> &str {
    match file_name.strip_suffix(EXAMPLE_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => file_name,
    }
}

/// Copy each layer into `destination` in order.
///
/// Existing files are overwritten, so later layers win on conflict. Only
/// entries that did not exist before are reported as created. Returns the
/// relative paths of all files written.
pub async fn materialize(
    layers: &[PathBuf],
    destination: &Path,
    project_type: ProjectType,
    progress: &dyn Progress,
) -> Result<Vec<PathBuf>> {
    if !exists(destination).await? {
        fs::create_dir_all(destination)
            .await
            .map_err(|e| Error::file_system("create", destination, e))?;
        progress.created(EntryKind::Directory, destination);
    }

    let mut written = BTreeSet::new();
    for layer in layers {
        copy_layer(layer, destination, project_type, progress, &mut written).await?;
    }

    Ok(written.into_iter().collect())
}

async fn copy_layer(
    source: &Path,
    destination: &Path,
    project_type: ProjectType,
    progress: &dyn Progress,
    written: &mut BTreeSet<PathBuf>,
) -> Result<()> {
    debug!(layer = %source.display(), "copying template layer");

    let mut walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::file_system("read", path, io::Error::from(e))
        })?;
        let is_dir = entry.file_type().is_dir();
        let file_name = entry.file_name().to_string_lossy();

        if project_type.excludes(&file_name) {
            debug!(entry = %entry.path().display(), %project_type, "skipping excluded entry");
            if is_dir {
                walker.skip_current_dir();
            }
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::file_system("read", entry.path(), io::Error::other(e)))?;
        let relative = if is_dir {
            relative.to_path_buf()
        } else {
            relative.with_file_name(destination_name(&file_name))
        };
        let target = destination.join(&relative);

        if is_dir {
            if !exists(&target).await? {
                fs::create_dir_all(&target)
                    .await
                    .map_err(|e| Error::file_system("create", &target, e))?;
                progress.created(EntryKind::Directory, &target);
            }
            continue;
        }

        let existed = exists(&target).await?;
        fs::copy(entry.path(), &target)
            .await
            .map_err(|e| Error::file_system("copy", entry.path(), e))?;
        if !existed {
            progress.created(EntryKind::File, &target);
        }
        written.insert(relative);
    }

    Ok(())
}

async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| Error::file_system("inspect", path, e))
}
