//! Template fetching from GitHub or a local directory
//!
//! Remote templates are repositories marked as templates on GitHub and can be
//! retrieved either as a zipball or with a shallow `git clone`. Either way the
//! tree is assembled under a hidden temporary name next to its destination
//! and only renamed into place once complete.

use super::catalog::{
    templates_from_repositories, GithubRepository, LocalCatalog, TemplateDescriptor,
};
use crate::error::{Error, Result};
use crate::shell::{CommandRunner, CommandSpec};
use std::fmt;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};
use url::Url;
use zip::ZipArchive;

const STAGING_PREFIX: &str = ".ts-new-";

/// How a remote template is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateMedium {
    /// Download the repository zipball
    #[default]
    Archive,
    /// Shallow `git clone`
    Clone,
}

impl fmt::Display for TemplateMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateMedium::Archive => f.write_str("archive"),
            TemplateMedium::Clone => f.write_str("clone"),
        }
    }
}

impl FromStr for TemplateMedium {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "archive" | "zip" => Ok(TemplateMedium::Archive),
            "clone" | "git" => Ok(TemplateMedium::Clone),
            other => Err(format!("unknown template medium: {}", other)),
        }
    }
}

/// GitHub-hosted templates
#[derive(Debug, Clone)]
pub struct RemoteSource {
    /// GitHub REST API base, e.g. `https://api.github.com`
    pub api_base: Url,
    /// Base used for clone URLs, e.g. `https://github.com`
    pub clone_base: Url,
    /// Account whose template repositories form the catalog
    pub owner: String,
    pub medium: TemplateMedium,
}

/// Template source - either remote repositories or a local directory
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(RemoteSource),
    Local(PathBuf),
}

/// Template fetcher - lists and retrieves templates from its source
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher for local templates
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::Local(path), user_agent)
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Whether retrieving templates needs the git binary
    pub fn requires_git(&self) -> bool {
        matches!(
            &self.source,
            TemplateSource::Remote(RemoteSource {
                medium: TemplateMedium::Clone,
                ..
            })
        )
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::network("build url", format!("{} cannot be a base", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// List the templates this source offers
    pub async fn list_templates(&self) -> Result<Vec<TemplateDescriptor>> {
        match &self.source {
            TemplateSource::Remote(remote) => {
                let mut url = Self::build_url(
                    &remote.api_base,
                    &["users", remote.owner.as_str(), "repos"],
                )?;
                url.query_pairs_mut().append_pair("type", "public");
                debug!(%url, "fetching template list");

                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| Error::network("fetch template list", e))?;

                if !response.status().is_success() {
                    return Err(Error::network(
                        "fetch template list",
                        format!("HTTP {} from {}", response.status(), url),
                    ));
                }

                let repos: Vec<GithubRepository> = response
                    .json()
                    .await
                    .map_err(|e| Error::network("fetch template list", e))?;
                Ok(templates_from_repositories(repos))
            }
            TemplateSource::Local(dir) => {
                let path = dir.join(LocalCatalog::FILE_NAME);
                let content = fs::read_to_string(&path)
                    .await
                    .map_err(|e| Error::file_system("read", &path, e))?;
                let catalog: LocalCatalog =
                    serde_yaml::from_str(&content).map_err(|e| Error::manifest(&path, e))?;
                Ok(catalog.descriptors())
            }
        }
    }

    /// Retrieve a remote template into `destination`, which must not exist.
    ///
    /// On failure nothing is left at `destination`.
    pub async fn fetch(
        &self,
        runner: &dyn CommandRunner,
        remote: &RemoteSource,
        identifier: &str,
        destination: &Path,
    ) -> Result<PathBuf> {
        info!(template = identifier, medium = %remote.medium, "fetching template");
        match remote.medium {
            TemplateMedium::Archive => {
                let url = Self::build_url(
                    &remote.api_base,
                    &["repos", remote.owner.as_str(), identifier, "zipball"],
                )?;
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| Error::network("fetch template", e))?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(Error::template_not_found(identifier));
                }
                if !response.status().is_success() {
                    return Err(Error::network(
                        "fetch template",
                        format!("HTTP {} from {}", response.status(), url),
                    ));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| Error::network("fetch template", e))?
                    .to_vec();
                let target = destination.to_path_buf();
                tokio::task::spawn_blocking(move || unpack_archive(&bytes, &target))
                    .await
                    .map_err(|e| Error::network("unpack template archive", e))??;
            }
            TemplateMedium::Clone => {
                let mut url =
                    Self::build_url(&remote.clone_base, &[remote.owner.as_str(), identifier])?;
                let path = format!("{}.git", url.path());
                url.set_path(&path);
                clone_into(runner, url.as_str(), destination).await?;
            }
        }
        Ok(destination.to_path_buf())
    }

    /// Lay out a template's file layers under `staging`, in copy order.
    ///
    /// Later layers override earlier ones when materialized.
    pub async fn stage(
        &self,
        runner: &dyn CommandRunner,
        template: &TemplateDescriptor,
        staging: &Path,
    ) -> Result<Vec<PathBuf>> {
        match &self.source {
            TemplateSource::Remote(remote) => {
                let destination = staging.join(&template.identifier);
                let root = self
                    .fetch(runner, remote, &template.identifier, &destination)
                    .await?;
                Ok(vec![root])
            }
            TemplateSource::Local(dir) => {
                let catalog_path = dir.join(LocalCatalog::FILE_NAME);
                let common = match fs::read_to_string(&catalog_path).await {
                    Ok(content) => serde_yaml::from_str::<LocalCatalog>(&content)
                        .map_err(|e| Error::manifest(&catalog_path, e))?
                        .common,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => "common".to_string(),
                    Err(e) => return Err(Error::file_system("read", &catalog_path, e)),
                };

                let template_dir = dir.join(&template.identifier);
                if !exists(&template_dir).await? {
                    return Err(Error::template_not_found(&template.identifier));
                }

                let mut layers = Vec::new();
                let common_dir = dir.join(common);
                if exists(&common_dir).await? {
                    layers.push(common_dir);
                }
                layers.push(template_dir);
                Ok(layers)
            }
        }
    }
}

async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| Error::file_system("inspect", path, e))
}

/// Hidden scratch directory next to `destination`
fn staging_dir_for(destination: &Path) -> Result<tempfile::TempDir> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| Error::file_system("create", parent, e))?;
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| Error::file_system("create staging directory in", parent, e))
}

/// Extract a zip archive to `destination`.
///
/// The archive is unpacked under a temporary name first. If it holds a
/// single top-level directory (as GitHub zipballs do), that directory becomes
/// `destination`.
pub fn unpack_archive(bytes: &[u8], destination: &Path) -> Result<()> {
    let staging = staging_dir_for(destination)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::network("read template archive", e))?;
    archive
        .extract(staging.path())
        .map_err(|e| Error::network("unpack template archive", e))?;

    promote(staging.path(), destination)
}

/// Move the unpacked tree in `staging` onto `destination`
fn promote(staging: &Path, destination: &Path) -> Result<()> {
    let entries = std::fs::read_dir(staging)
        .and_then(|dir| dir.collect::<io::Result<Vec<_>>>())
        .map_err(|e| Error::file_system("read", staging, e))?;

    let root = match entries.as_slice() {
        [only] if only.path().is_dir() => only.path(),
        _ => staging.to_path_buf(),
    };

    debug!(from = %root.display(), to = %destination.display(), "promoting template");
    std::fs::rename(&root, destination).map_err(|e| Error::file_system("rename", &root, e))
}

async fn clone_into(runner: &dyn CommandRunner, url: &str, destination: &Path) -> Result<()> {
    let staging = staging_dir_for(destination)?;
    let checkout = staging.path().join("checkout");
    let checkout_arg = checkout.to_string_lossy().into_owned();

    let spec = CommandSpec::new("git", ["clone", "--depth", "1", url, checkout_arg.as_str()])
        .suppressed();
    runner
        .run(&spec)
        .await
        .map_err(|e| Error::network("clone template", e))?;

    let git_dir = checkout.join(".git");
    if exists(&git_dir).await? {
        fs::remove_dir_all(&git_dir)
            .await
            .map_err(|e| Error::file_system("remove", &git_dir, e))?;
    }

    fs::rename(&checkout, destination)
        .await
        .map_err(|e| Error::file_system("rename", &checkout, e))
}
