//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to fix product identity and the defaults
//! that environment variables may override.

/// Configuration trait for the scaffolding product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// GitHub account whose template repositories form the catalog
    fn template_owner(&self) -> &'static str;

    /// Prefix for environment overrides, e.g. `TS_NEW` for `TS_NEW_TEMPLATE_DIR`
    fn env_prefix(&self) -> &'static str;

    /// GitHub REST API base URL
    fn api_base_url(&self) -> &'static str {
        "https://api.github.com"
    }

    /// Base URL for cloning template repositories
    fn clone_base_url(&self) -> &'static str {
        "https://github.com"
    }

    /// Message of the first commit in a generated project
    fn initial_commit_message(&self) -> &'static str {
        "chore: initial commit"
    }

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
