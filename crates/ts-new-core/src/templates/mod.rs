//! Template listing, fetching, and copying
//!
//! This module provides:
//! - Template catalog types (`TemplateDescriptor`, local `template.yaml`)
//! - Template fetching from GitHub (zipball or clone) or a local directory
//! - Materializing template layers into a project directory

pub mod catalog;
pub mod fetcher;
pub mod materializer;

pub use catalog::{LocalCatalog, TemplateDescriptor};
pub use fetcher::{RemoteSource, TemplateFetcher, TemplateMedium, TemplateSource};
pub use materializer::materialize;
