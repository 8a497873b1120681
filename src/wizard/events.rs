use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::services::ProjectSource;
use crate::template::ProjectTemplate;

/// One user action replayed against a wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum WizardCommand {
    SelectStack {
        stack_id: Option<String>,
    },
    SetGitLocation {
        location: String,
    },
    SetZipLocation {
        location: String,
        #[serde(default)]
        skip_first_level: bool,
    },
    ToggleTemplate {
        name: String,
        checked: bool,
    },
    AddFromSource {
        source: ProjectSource,
    },
    RenameProject {
        from: String,
        to: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardScript {
    #[serde(default)]
    pub commands: Vec<WizardCommand>,
}

/// Snapshot of what the wizard would render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardSummary {
    pub stack_id: Option<String>,
    pub filtered_templates: Vec<String>,
    pub new_templates_number: usize,
    pub templates_selected: bool,
    pub git_location: String,
    pub zip_location: String,
    pub zip_skip_first_level: bool,
    pub ready_to_import: Vec<ProjectTemplate>,
}

pub fn load_script(path: &Path) -> Result<WizardScript> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read wizard script `{}`", path.display()))?;
    serde_yaml::from_str::<WizardScript>(&raw)
        .with_context(|| format!("failed to parse wizard script `{}`", path.display()))
}
