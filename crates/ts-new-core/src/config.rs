//! Template source settings from product defaults and environment overrides

use crate::product::ProductConfig;
use crate::templates::{RemoteSource, TemplateFetcher, TemplateMedium, TemplateSource};
use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

pub const TEMPLATE_DIR_VAR: &str = "TEMPLATE_DIR";
pub const TEMPLATE_OWNER_VAR: &str = "TEMPLATE_OWNER";
pub const API_URL_VAR: &str = "API_URL";
pub const TEMPLATE_MEDIUM_VAR: &str = "TEMPLATE_MEDIUM";
pub const LOG_VAR: &str = "LOG";

/// Full environment variable name, e.g. `TS_NEW_TEMPLATE_DIR`
pub fn env_key<C: ProductConfig>(config: &C, suffix: &str) -> String {
    format!("{}_{}", config.env_prefix(), suffix)
}

/// Where templates come from for this run
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Local template tree; takes precedence over the remote catalog
    pub local_dir: Option<PathBuf>,
    pub owner: String,
    pub api_base: Url,
    pub clone_base: Url,
    pub medium: TemplateMedium,
}

impl SourceSettings {
    /// Resolve settings from the process environment
    pub fn from_env<C: ProductConfig>(config: &C) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Resolve settings using `lookup` for environment values
    pub fn from_lookup<C, F>(config: &C, lookup: F) -> Result<Self>
    where
        C: ProductConfig,
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&env_key(config, suffix)).filter(|value| !value.trim().is_empty())
        };

        let api_url = var(API_URL_VAR).unwrap_or_else(|| config.api_base_url().to_string());
        let api_base =
            Url::parse(&api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;
        let clone_base = Url::parse(config.clone_base_url())
            .with_context(|| format!("Invalid clone URL: {}", config.clone_base_url()))?;

        let medium = match var(TEMPLATE_MEDIUM_VAR) {
            Some(value) => value
                .parse::<TemplateMedium>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", env_key(config, TEMPLATE_MEDIUM_VAR)))?,
            None => TemplateMedium::default(),
        };

        Ok(Self {
            local_dir: var(TEMPLATE_DIR_VAR).map(PathBuf::from),
            owner: var(TEMPLATE_OWNER_VAR).unwrap_or_else(|| config.template_owner().to_string()),
            api_base,
            clone_base,
            medium,
        })
    }

    pub fn template_source(&self) -> TemplateSource {
        match &self.local_dir {
            Some(dir) => TemplateSource::Local(dir.clone()),
            None => TemplateSource::Remote(RemoteSource {
                api_base: self.api_base.clone(),
                clone_base: self.clone_base.clone(),
                owner: self.owner.clone(),
                medium: self.medium,
            }),
        }
    }

    /// Build a fetcher for the resolved source
    pub fn fetcher(&self, user_agent: &str) -> TemplateFetcher {
        TemplateFetcher::new(self.template_source(), user_agent)
    }
}
