//! Template catalog types and parsing

use crate::project::ProjectType;
use serde::{Deserialize, Serialize};

/// A template the user can choose from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    /// Repository or directory name used to fetch the template
    pub identifier: String,
    /// Short name shown in the project type prompt
    pub display_name: String,
    pub description: String,
    pub project_type: ProjectType,
}

impl TemplateDescriptor {
    /// Prompt label, e.g. `node (plain Node.js runtime)`
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} ({})", self.display_name, self.description)
        }
    }
}

/// The subset of a GitHub repository listing entry we care about
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepository {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_template: bool,
}

impl GithubRepository {
    /// Project type encoded as the last `-` separated part of the name
    fn project_type(&self) -> Option<ProjectType> {
        self.name.rsplit('-').next()?.parse().ok()
    }
}

/// Keep template repositories whose name ends in a known project type
pub fn templates_from_repositories(repos: Vec<GithubRepository>) -> Vec<TemplateDescriptor> {
    repos
        .into_iter()
        .filter(|repo| repo.is_template)
        .filter_map(|repo| {
            let project_type = repo.project_type()?;
            Some(TemplateDescriptor {
                display_name: project_type.as_str().to_string(),
                description: repo.description.unwrap_or_default(),
                identifier: repo.name,
                project_type,
            })
        })
        .collect()
}

fn default_common() -> String {
    "common".to_string()
}

/// One entry of a local catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTemplate {
    /// Directory name; must also be a project type
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Local catalog manifest (`<template dir>/template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCatalog {
    /// Directory holding files shared by every template
    #[serde(default = "default_common")]
    pub common: String,

    pub templates: Vec<LocalTemplate>,
}

impl LocalCatalog {
    pub const FILE_NAME: &'static str = "template.yaml";

    /// Descriptors for entries that name a known project type
    pub fn descriptors(&self) -> Vec<TemplateDescriptor> {
        self.templates
            .iter()
            .filter_map(|t| {
                let project_type: ProjectType = t.name.parse().ok()?;
                Some(TemplateDescriptor {
                    identifier: t.name.clone(),
                    display_name: project_type.as_str().to_string(),
                    description: t.description.clone(),
                    project_type,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_templates_with_known_type_are_listed() {
        let repos: Vec<GithubRepository> = serde_json::from_str(
            r#"[
                {"name": "template-node", "full_name": "mkvlrn/template-node",
                 "description": "plain node", "is_template": true},
                {"name": "template-vite", "description": null, "is_template": true},
                {"name": "template-deno", "description": "unknown", "is_template": true},
                {"name": "dotfiles", "description": "not a template", "is_template": false},
                {"name": "template-next", "description": "next", "is_template": false}
            ]"#,
        )
        .unwrap();

        let templates = templates_from_repositories(repos);

        assert_eq!(
            templates,
            vec![
                TemplateDescriptor {
                    identifier: "template-node".to_string(),
                    display_name: "node".to_string(),
                    description: "plain node".to_string(),
                    project_type: ProjectType::Node,
                },
                TemplateDescriptor {
                    identifier: "template-vite".to_string(),
                    display_name: "vite".to_string(),
                    description: String::new(),
                    project_type: ProjectType::Vite,
                },
            ]
        );
    }

    #[test]
    fn test_label() {
        let mut descriptor = TemplateDescriptor {
            identifier: "template-nest".to_string(),
            display_name: "nest".to_string(),
            description: "NestJS server".to_string(),
            project_type: ProjectType::Nest,
        };
        assert_eq!(descriptor.label(), "nest (NestJS server)");
        descriptor.description.clear();
        assert_eq!(descriptor.label(), "nest");
    }

    #[test]
    fn test_local_catalog_parsing() {
        let catalog: LocalCatalog = serde_yaml::from_str(
            r#"
templates:
  - name: node
    description: plain Node.js runtime
  - name: next
  - name: astro
    description: not supported
"#,
        )
        .unwrap();

        assert_eq!(catalog.common, "common");
        let descriptors = catalog.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].project_type, ProjectType::Node);
        assert_eq!(descriptors[0].description, "plain Node.js runtime");
        assert_eq!(descriptors[1].identifier, "next");
    }

    #[test]
    fn test_bundled_catalog_covers_every_project_type() {
        let catalog: LocalCatalog =
            serde_yaml::from_str(include_str!("../../../../templates/template.yaml")).unwrap();
        let types: Vec<ProjectType> = catalog
            .descriptors()
            .into_iter()
            .map(|d| d.project_type)
            .collect();
        assert_eq!(types, ProjectType::ALL.to_vec());
    }
}
