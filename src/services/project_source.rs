use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::selector::TemplateSelectorService;
use super::source::{GitImportService, ZipImportService};
use crate::bus::ProjectTemplateBus;
use crate::error::WizardError;
use crate::template::ProjectTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSource {
    Templates,
    Git,
    Zip,
}

impl ProjectSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Templates => "templates",
            Self::Git => "git",
            Self::Zip => "zip",
        }
    }
}

impl Display for ProjectSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectSource {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "templates" | "samples" => Ok(Self::Templates),
            "git" => Ok(Self::Git),
            "zip" => Ok(Self::Zip),
            other => Err(anyhow!(
                "invalid project source `{other}`; expected `templates`, `git` or `zip`"
            )),
        }
    }
}

/// Owner of the ready-to-import list. Every template added to it is announced
/// on the project template bus.
pub struct ProjectSourceSelectorService {
    bus: ProjectTemplateBus,
    git: Rc<GitImportService>,
    zip: Rc<ZipImportService>,
    template_selector: Rc<TemplateSelectorService>,
    ready_to_import: RefCell<Vec<ProjectTemplate>>,
}

impl ProjectSourceSelectorService {
    pub fn new(
        bus: ProjectTemplateBus,
        git: Rc<GitImportService>,
        zip: Rc<ZipImportService>,
        template_selector: Rc<TemplateSelectorService>,
    ) -> Self {
        Self {
            bus,
            git,
            zip,
            template_selector,
            ready_to_import: RefCell::new(Vec::new()),
        }
    }

    pub fn ready_to_import(&self) -> Vec<ProjectTemplate> {
        self.ready_to_import.borrow().clone()
    }

    /// Adds the project(s) described by `source` to the ready-to-import list
    /// and returns their names. Nothing is added unless every name is free.
    pub fn add_project_template_from_source(
        &self,
        source: ProjectSource,
    ) -> Result<Vec<String>, WizardError> {
        let templates = match source {
            ProjectSource::Git => vec![self.git.project_template().ok_or(
                WizardError::EmptyLocation {
                    project_source: source,
                },
            )?],
            ProjectSource::Zip => vec![self.zip.project_template().ok_or(
                WizardError::EmptyLocation {
                    project_source: source,
                },
            )?],
            ProjectSource::Templates => {
                let selected = self.template_selector.templates();
                if selected.is_empty() {
                    return Err(WizardError::NoTemplatesSelected);
                }
                selected
            }
        };

        self.add_project_templates(source, templates)
    }

    fn add_project_templates(
        &self,
        source: ProjectSource,
        templates: Vec<ProjectTemplate>,
    ) -> Result<Vec<String>, WizardError> {
        let names: Vec<String> = templates.iter().map(|t| t.name.clone()).collect();
        {
            let mut ready = self.ready_to_import.borrow_mut();
            for (index, name) in names.iter().enumerate() {
                let taken = ready.iter().any(|existing| &existing.name == name)
                    || names[..index].contains(name);
                if taken {
                    return Err(WizardError::DuplicateProjectName { name: name.clone() });
                }
            }
            ready.extend(templates);
        }

        info!(
            source = %source,
            projects = ?names,
            "added projects to ready-to-import list"
        );
        for name in &names {
            self.bus.publish(name.as_str());
        }

        Ok(names)
    }

    /// Replaces the project known as `original_name` with `template`.
    pub fn update_project_template(
        &self,
        original_name: &str,
        template: ProjectTemplate,
    ) -> Result<(), WizardError> {
        if !self.is_project_template_name_unique(&template.name, original_name) {
            return Err(WizardError::DuplicateProjectName {
                name: template.name,
            });
        }

        let mut ready = self.ready_to_import.borrow_mut();
        let slot = ready
            .iter_mut()
            .find(|existing| existing.name == original_name)
            .ok_or_else(|| WizardError::UnknownProject {
                name: original_name.to_owned(),
            })?;

        info!(from = original_name, to = %template.name, "updated project metadata");
        *slot = template;
        Ok(())
    }

    pub fn remove_project_template(&self, name: &str) -> Result<ProjectTemplate, WizardError> {
        let mut ready = self.ready_to_import.borrow_mut();
        let index = ready
            .iter()
            .position(|existing| existing.name == name)
            .ok_or_else(|| WizardError::UnknownProject {
                name: name.to_owned(),
            })?;

        info!(name, "removed project from ready-to-import list");
        Ok(ready.remove(index))
    }

    /// True when no project other than `exclude_name` is called `candidate`.
    pub fn is_project_template_name_unique(&self, candidate: &str, exclude_name: &str) -> bool {
        !self
            .ready_to_import
            .borrow()
            .iter()
            .filter(|existing| existing.name != exclude_name)
            .any(|existing| existing.name == candidate)
    }
}
