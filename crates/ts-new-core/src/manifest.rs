//! Structured editing of `package.json`
//!
//! Field paths use dots to address nested objects, so `scripts.dev` is the
//! `dev` key inside the top-level `scripts` object.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub const MANIFEST_FILE: &str = "package.json";

/// A loaded package manifest
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl PackageManifest {
    /// Parse manifest text; `path` is used for error messages and saving
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let value: Value =
            serde_json::from_str(content).map_err(|e| Error::manifest(&path, e))?;
        match value {
            Value::Object(fields) => Ok(Self { path, fields }),
            _ => Err(Error::manifest(&path, "top level is not an object")),
        }
    }

    /// Load `package.json` from a project directory
    pub async fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::file_system("read", &path, e))?;
        Self::parse(path, &content)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a field by dotted path
    pub fn get(&self, field: &str) -> Option<&Value> {
        let mut parts = field.split('.');
        let first = parts.next()?;
        parts.try_fold(self.fields.get(first)?, |value, key| value.get(key))
    }

    /// Look up a string field by dotted path
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Set a field by dotted path, creating intermediate objects as needed
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let (parents, leaf) = split_path(field);
        let mut target = &mut self.fields;
        for key in parents {
            let entry = target
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            target = match entry {
                Value::Object(map) => map,
                _ => {
                    return Err(Error::manifest(
                        &self.path,
                        format!("cannot set {}: {} is not an object", field, key),
                    ))
                }
            };
        }
        target.insert(leaf.to_string(), value.into());
        debug!(field, "manifest field set");
        Ok(())
    }

    /// Delete a field by dotted path; absent fields are ignored
    pub fn delete(&mut self, field: &str) {
        let (parents, leaf) = split_path(field);
        let mut target = &mut self.fields;
        for key in parents {
            match target.get_mut(key) {
                Some(Value::Object(map)) => target = map,
                _ => return,
            }
        }
        if target.shift_remove(leaf).is_some() {
            debug!(field, "manifest field deleted");
        }
    }

    /// Render as two-space indented JSON with a trailing newline
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.fields)
            .map_err(|e| Error::manifest(&self.path, e))?;
        out.push('\n');
        Ok(out)
    }

    /// Write the manifest back to where it was loaded from
    pub async fn save(&self) -> Result<()> {
        let content = self.to_pretty_string()?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| Error::file_system("write", &self.path, e))
    }
}

fn split_path(field: &str) -> (Vec<&str>, &str) {
    let mut parts: Vec<&str> = field.split('.').collect();
    let leaf = parts.pop().unwrap_or(field);
    (parts, leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "name": "template-node",
  "version": "1.0.0",
  "keywords": ["template"],
  "scripts": {
    "test": "vitest"
  }
}"#;

    #[test]
    fn test_get_nested_fields() {
        let manifest = PackageManifest::parse("package.json", SAMPLE).unwrap();
        assert_eq!(manifest.get_str("name"), Some("template-node"));
        assert_eq!(manifest.get_str("scripts.test"), Some("vitest"));
        assert_eq!(manifest.get("scripts.missing"), None);
        assert_eq!(manifest.get("name.deeper"), None);
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut manifest = PackageManifest::parse("package.json", "{}").unwrap();
        manifest.set("scripts.dev", "vite").unwrap();
        assert_eq!(manifest.get_str("scripts.dev"), Some("vite"));
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut manifest = PackageManifest::parse("package.json", SAMPLE).unwrap();
        let err = manifest.set("name.first", "x").unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn test_delete_keeps_order_of_remaining_keys() {
        let mut manifest = PackageManifest::parse("package.json", SAMPLE).unwrap();
        manifest.delete("keywords");
        manifest.delete("repository");
        manifest.delete("scripts.nope.deeper");

        let rendered = manifest.to_pretty_string().unwrap();
        assert_eq!(
            rendered,
            "{\n  \"name\": \"template-node\",\n  \"version\": \"1.0.0\",\n  \"scripts\": {\n    \"test\": \"vitest\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_non_object_rejected() {
        let err = PackageManifest::parse("package.json", "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("not an object"));
        let err = PackageManifest::parse("package.json", "{ nope").unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), SAMPLE).unwrap();

        let mut manifest = PackageManifest::load(dir.path()).await.unwrap();
        manifest.set("name", "my-app").unwrap();
        manifest.save().await.unwrap();

        let reloaded = PackageManifest::load(dir.path()).await.unwrap();
        assert_eq!(reloaded.get_str("name"), Some("my-app"));
    }

    #[tokio::test]
    async fn test_load_missing_manifest_is_file_system_error() {
        let dir = TempDir::new().unwrap();
        let err = PackageManifest::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::FileSystem { action: "read", .. }));
    }
}
