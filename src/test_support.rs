use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::template::registry::{TemplateRegistry, TemplateRegistryError};
use crate::template::{ProjectTemplate, Stack};

pub fn temp_path(prefix: &str) -> PathBuf {
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "workspace_wizard_{prefix}_{}_{}",
        std::process::id(),
        now_ns
    ))
}

pub fn remove_dir_if_exists(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}

pub fn template(name: &str, project_type: &str, display_name: &str, tags: &[&str]) -> ProjectTemplate {
    ProjectTemplate {
        name: name.to_owned(),
        display_name: display_name.to_owned(),
        project_type: project_type.to_owned(),
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        path: format!("/{name}"),
        ..ProjectTemplate::default()
    }
}

pub fn sample_templates() -> Vec<ProjectTemplate> {
    vec![
        template("web-java-spring", "maven", "web-java-spring", &["Java", "Spring", "Maven"]),
        template("console-java-simple", "maven", "console-java-simple", &["Java", "Maven"]),
        template("web-java-petclinic", "maven", "web-java-petclinic", &["Java", "MySQL"]),
        template("console-python3-simple", "python", "console-python3-simple", &["Python"]),
        template("nodejs-hello-world", "node-js", "nodejs-hello-world", &["Node.js", "JavaScript"]),
        template("blank-project", "blank", "blank-project", &[]),
    ]
}

pub fn sample_stacks() -> Vec<Stack> {
    vec![
        stack("java-default", &["Java", "JDK", "Maven"]),
        stack("java-mysql", &["Java", "MySQL"]),
        stack("python-default", &["Python"]),
        stack("node-default", &["Node.js"]),
        stack("untagged", &[]),
    ]
}

fn stack(id: &str, tags: &[&str]) -> Stack {
    Stack {
        id: id.to_owned(),
        name: id.to_owned(),
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
    }
}

/// Writes `templates.yaml` and `stacks.yaml` built from the sample fixtures
/// into `dir` and returns their paths.
pub fn write_catalog(dir: &Path) -> (PathBuf, PathBuf) {
    std::fs::create_dir_all(dir).expect("catalog dir should be created");
    let templates_path = dir.join("templates.yaml");
    let stacks_path = dir.join("stacks.yaml");

    let templates =
        serde_yaml::to_string(&sample_templates()).expect("templates should serialize");
    let stacks = serde_yaml::to_string(&sample_stacks()).expect("stacks should serialize");
    std::fs::write(&templates_path, templates).expect("templates file should be written");
    std::fs::write(&stacks_path, stacks).expect("stacks file should be written");

    (templates_path, stacks_path)
}

pub fn apply_wizard_test_env(
    command: &mut Command,
    templates_path: &Path,
    stacks_path: &Path,
    log_dir: &Path,
) {
    command.env("WIZARD_TEMPLATES_SOURCE", templates_path.as_os_str());
    command.env("WIZARD_STACKS_FILE", stacks_path.as_os_str());
    command.env("WIZARD_FETCH_TIMEOUT_MS", "1000");
    command.env("WIZARD_LOG_DIR", log_dir.as_os_str());
    command.env("WIZARD_FILE_LOG", "debug");
    command.env("RUST_LOG", "error");
}

/// In-memory registry for tests; `failing()` always errors.
#[derive(Debug, Clone)]
pub struct StaticTemplateRegistry {
    templates: Option<Vec<ProjectTemplate>>,
}

impl StaticTemplateRegistry {
    pub fn new(templates: Vec<ProjectTemplate>) -> Self {
        Self {
            templates: Some(templates),
        }
    }

    pub fn failing() -> Self {
        Self { templates: None }
    }
}

impl TemplateRegistry for StaticTemplateRegistry {
    async fn fetch_templates(&self) -> Result<Vec<ProjectTemplate>, TemplateRegistryError> {
        self.templates.clone().ok_or_else(|| {
            TemplateRegistryError::Configuration("static registry has no templates".to_owned())
        })
    }
}
