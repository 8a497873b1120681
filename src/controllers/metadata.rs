use std::rc::Rc;

use tracing::debug;

use crate::error::WizardError;
use crate::services::{ProjectMetadataService, ProjectSourceSelectorService};
use crate::template::ProjectTemplate;

pub const MAX_PROJECT_NAME_LEN: usize = 128;

/// Edits the metadata of one project in the ready-to-import list.
pub struct ProjectMetadataController {
    metadata_service: Rc<ProjectMetadataService>,
    project_source_selector: Rc<ProjectSourceSelectorService>,
    template: ProjectTemplate,
    template_name: String,
}

impl ProjectMetadataController {
    pub fn new(
        metadata_service: Rc<ProjectMetadataService>,
        project_source_selector: Rc<ProjectSourceSelectorService>,
        template: ProjectTemplate,
    ) -> Result<Self, WizardError> {
        if template.name.trim().is_empty() {
            return Err(WizardError::MissingTemplateName);
        }

        let template_name = template.name.clone();
        Ok(Self {
            metadata_service,
            project_source_selector,
            template,
            template_name,
        })
    }

    pub fn template(&self) -> &ProjectTemplate {
        &self.template
    }

    /// Mutable access for form bindings; call `on_metadata_changed` after.
    pub fn template_mut(&mut self) -> &mut ProjectTemplate {
        &mut self.template
    }

    /// Name the project had when editing started.
    pub fn original_name(&self) -> &str {
        &self.template_name
    }

    pub fn on_metadata_changed(&self) {
        self.metadata_service.on_metadata_changed(&self.template);
    }

    pub fn is_name_unique(&self, name: &str) -> bool {
        self.project_source_selector
            .is_project_template_name_unique(name, &self.template_name)
    }

    pub fn is_name_valid(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_PROJECT_NAME_LEN
            && name
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
    }

    /// Writes the edited template back into the ready-to-import list.
    pub fn save(&mut self) -> Result<(), WizardError> {
        let name = self.template.name.clone();
        if !Self::is_name_valid(&name) {
            return Err(WizardError::InvalidProjectName { name });
        }

        self.project_source_selector
            .update_project_template(&self.template_name, self.template.clone())?;
        self.on_metadata_changed();

        debug!(from = %self.template_name, to = %name, "saved project metadata");
        self.template_name = name;
        Ok(())
    }
}
