use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

pub mod registry;

pub const SKIP_FIRST_LEVEL_PARAMETER: &str = "skipFirstLevel";

/// A predefined project skeleton offered for import. `name` is its identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ProjectSourceLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSourceLocation {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// Runtime profile whose tags drive template filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Stable sort by project type, then display name.
pub fn sort_templates(templates: &mut [ProjectTemplate]) {
    templates.sort_by(|left, right| {
        left.project_type
            .cmp(&right.project_type)
            .then_with(|| left.display_name.cmp(&right.display_name))
    });
}

pub fn lowercase_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_lowercase()).collect()
}

/// `stack_tags` must already be lower-cased.
pub fn has_matching_tag(template: &ProjectTemplate, stack_tags: &[String]) -> bool {
    template
        .tags
        .iter()
        .map(|tag| tag.to_lowercase())
        .any(|tag| stack_tags.contains(&tag))
}

pub fn load_stacks(path: &Path) -> Result<Vec<Stack>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read stacks file `{}`", path.display()))?;
    let stacks = serde_yaml::from_str::<Vec<Stack>>(&raw)
        .with_context(|| format!("failed to parse stacks file `{}`", path.display()))?;

    for stack in &stacks {
        ensure!(
            !stack.id.trim().is_empty(),
            "stacks file `{}` contains a stack without an id",
            path.display()
        );
    }

    Ok(stacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remove_dir_if_exists, template, temp_path};

    #[test]
    fn template_deserializes_camel_case_fields() {
        let raw = r#"{
            "name": "web-java-spring",
            "displayName": "web-java-spring",
            "projectType": "maven",
            "tags": ["Java", "Spring"],
            "source": {"type": "git", "location": "https://github.com/che-samples/web-java-spring.git"}
        }"#;

        let template: ProjectTemplate = serde_json::from_str(raw).expect("template should parse");
        assert_eq!(template.display_name, "web-java-spring");
        assert_eq!(template.project_type, "maven");
        assert_eq!(template.tags, vec!["Java", "Spring"]);
        let source = template.source.expect("source should be present");
        assert_eq!(source.kind, "git");
        assert!(source.parameters.is_empty());
    }

    #[test]
    fn sort_orders_by_project_type_then_display_name() {
        let mut templates = vec![
            template("b", "maven", "Beta", &[]),
            template("c", "blank", "Zeta", &[]),
            template("a", "maven", "Alpha", &[]),
        ];

        sort_templates(&mut templates);

        let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn tag_match_ignores_template_tag_case() {
        let java = template("t1", "maven", "t1", &["Java"]);
        let python = template("t2", "python", "t2", &["python"]);
        let stack_tags = lowercase_tags(&["java".to_owned(), "WEB".to_owned()]);

        assert!(has_matching_tag(&java, &stack_tags));
        assert!(!has_matching_tag(&python, &stack_tags));
    }

    #[test]
    fn load_stacks_rejects_missing_id() {
        let dir = temp_path("stacks");
        std::fs::create_dir_all(&dir).expect("temp dir should be created");
        let path = dir.join("stacks.yaml");
        std::fs::write(&path, "- id: ''\n  tags: [java]\n").expect("stacks file should be written");

        let error = load_stacks(&path).expect_err("blank id should fail");
        assert!(error.to_string().contains("without an id"));

        remove_dir_if_exists(&dir);
    }
}
