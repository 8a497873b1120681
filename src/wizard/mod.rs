use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use crate::bus::ProjectTemplateBus;
use crate::controllers::{
    ImportGitProjectController, ImportZipProjectController, ProjectMetadataController,
    TemplateSelectorController,
};
use crate::error::WizardError;
use crate::services::{
    GitImportService, ProjectMetadataService, ProjectSource, ProjectSourceSelectorService,
    StackSelectorService, TemplateSelectorService, ZipImportService,
};
use crate::template::{ProjectTemplate, Stack};
use crate::template::registry::{TemplateRegistry, TemplateRegistryError};

pub mod events;

use self::events::{WizardCommand, WizardSummary};

/// Everything the project source step of the wizard needs, wired to one bus.
/// Dropping the session tears the controllers down and unsubscribes them.
pub struct WizardSession {
    bus: ProjectTemplateBus,
    stack_selector: Rc<StackSelectorService>,
    metadata_service: Rc<ProjectMetadataService>,
    project_source_selector: Rc<ProjectSourceSelectorService>,
    git_controller: Rc<RefCell<ImportGitProjectController<GitImportService>>>,
    zip_controller: Rc<RefCell<ImportZipProjectController<ZipImportService>>>,
    template_controller: Rc<RefCell<TemplateSelectorController>>,
}

impl WizardSession {
    pub fn new(stacks: Vec<Stack>) -> Self {
        let bus = ProjectTemplateBus::new();
        let git_service = Rc::new(GitImportService::new());
        let zip_service = Rc::new(ZipImportService::new());
        let template_selector = Rc::new(TemplateSelectorService::new());
        let stack_selector = Rc::new(StackSelectorService::new(stacks));
        let metadata_service = Rc::new(ProjectMetadataService::new());
        let project_source_selector = Rc::new(ProjectSourceSelectorService::new(
            bus.clone(),
            Rc::clone(&git_service),
            Rc::clone(&zip_service),
            Rc::clone(&template_selector),
        ));

        let git_controller = ImportGitProjectController::attach(git_service, &bus);
        let zip_controller = ImportZipProjectController::attach(zip_service, &bus);
        let template_controller = TemplateSelectorController::attach(
            template_selector,
            Rc::clone(&stack_selector),
            &bus,
        );

        Self {
            bus,
            stack_selector,
            metadata_service,
            project_source_selector,
            git_controller,
            zip_controller,
            template_controller,
        }
    }

    pub fn bus(&self) -> &ProjectTemplateBus {
        &self.bus
    }

    pub async fn load_templates<R: TemplateRegistry>(
        &self,
        registry: &R,
    ) -> Result<(), TemplateRegistryError> {
        TemplateSelectorController::fetch_templates(&self.template_controller, registry).await
    }

    pub fn select_stack(&self, stack_id: Option<&str>) -> Result<(), WizardError> {
        if let Some(id) = stack_id {
            if self.stack_selector.stack_by_id(id).is_none() {
                return Err(WizardError::UnknownStack { id: id.to_owned() });
            }
        }

        self.stack_selector.select_stack(stack_id);
        Ok(())
    }

    pub fn filtered_templates(&self) -> Vec<ProjectTemplate> {
        self.template_controller
            .borrow()
            .filtered_templates()
            .to_vec()
    }

    pub fn set_git_location(&self, location: &str) {
        self.git_controller.borrow_mut().set_location(location);
    }

    pub fn set_zip_location(&self, location: &str, skip_first_level: bool) {
        let mut controller = self.zip_controller.borrow_mut();
        controller.set_location(location);
        controller.set_skip_first_level(skip_first_level);
    }

    pub fn toggle_template(&self, name: &str, checked: bool) {
        self.template_controller
            .borrow_mut()
            .on_template_clicked(name, checked);
    }

    pub fn add_from_source(&self, source: ProjectSource) -> Result<Vec<String>, WizardError> {
        self.project_source_selector
            .add_project_template_from_source(source)
    }

    /// Opens the metadata editor for a project in the ready-to-import list.
    pub fn edit_project(&self, name: &str) -> Result<ProjectMetadataController, WizardError> {
        let template = self
            .project_source_selector
            .ready_to_import()
            .into_iter()
            .find(|template| template.name == name)
            .ok_or_else(|| WizardError::UnknownProject {
                name: name.to_owned(),
            })?;

        ProjectMetadataController::new(
            Rc::clone(&self.metadata_service),
            Rc::clone(&self.project_source_selector),
            template,
        )
    }

    pub fn rename_project(&self, from: &str, to: &str) -> Result<(), WizardError> {
        let mut editor = self.edit_project(from)?;
        if !editor.is_name_unique(to) {
            return Err(WizardError::DuplicateProjectName {
                name: to.to_owned(),
            });
        }

        let template = editor.template_mut();
        template.name = to.to_owned();
        template.path = format!("/{to}");
        editor.save()
    }

    pub fn apply(&self, command: &WizardCommand) -> Result<(), WizardError> {
        info!(?command, "applying wizard command");

        match command {
            WizardCommand::SelectStack { stack_id } => self.select_stack(stack_id.as_deref())?,
            WizardCommand::SetGitLocation { location } => self.set_git_location(location),
            WizardCommand::SetZipLocation {
                location,
                skip_first_level,
            } => self.set_zip_location(location, *skip_first_level),
            WizardCommand::ToggleTemplate { name, checked } => {
                self.toggle_template(name, *checked)
            }
            WizardCommand::AddFromSource { source } => {
                self.add_from_source(*source)?;
            }
            WizardCommand::RenameProject { from, to } => self.rename_project(from, to)?,
        }

        Ok(())
    }

    pub fn summary(&self) -> WizardSummary {
        let templates = self.template_controller.borrow();
        let git = self.git_controller.borrow();
        let zip = self.zip_controller.borrow();
        let new_templates_number = templates.new_templates_number();

        WizardSummary {
            stack_id: self.stack_selector.stack_id(),
            filtered_templates: templates
                .filtered_templates()
                .iter()
                .map(|template| template.name.clone())
                .collect(),
            new_templates_number,
            templates_selected: TemplateSelectorController::is_template_selected(
                i64::try_from(new_templates_number).unwrap_or(i64::MAX),
            ),
            git_location: git.location().to_owned(),
            zip_location: zip.location().to_owned(),
            zip_skip_first_level: zip.skip_first_level(),
            ready_to_import: self.project_source_selector.ready_to_import(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WizardSession;
    use crate::error::WizardError;
    use crate::services::ProjectSource;
    use crate::test_support::{StaticTemplateRegistry, sample_stacks, sample_templates};

    async fn loaded_session() -> WizardSession {
        let session = WizardSession::new(sample_stacks());
        session
            .load_templates(&StaticTemplateRegistry::new(sample_templates()))
            .await
            .expect("templates should load");
        session
    }

    #[tokio::test]
    async fn adding_git_project_clears_git_field_only() {
        let session = loaded_session().await;
        session.set_git_location("https://github.com/che-samples/foo.git");
        session.set_zip_location("https://host/foo-archive.zip", true);

        let names = session
            .add_from_source(ProjectSource::Git)
            .expect("git project should be added");

        assert_eq!(names, vec!["foo"]);
        let summary = session.summary();
        assert_eq!(summary.git_location, "");
        assert_eq!(summary.zip_location, "https://host/foo-archive.zip");
        assert!(summary.zip_skip_first_level);
        assert_eq!(summary.ready_to_import.len(), 1);
    }

    #[tokio::test]
    async fn scp_style_git_location_is_cleared_after_add() {
        let session = loaded_session().await;
        session.set_git_location("git@github.com:foo.git");

        assert_eq!(
            session.add_from_source(ProjectSource::Git),
            Ok(vec!["foo".to_owned()])
        );
        assert_eq!(session.summary().git_location, "");
        assert_eq!(
            session.add_from_source(ProjectSource::Git),
            Err(WizardError::EmptyLocation {
                project_source: ProjectSource::Git
            })
        );
    }

    #[tokio::test]
    async fn git_location_without_extension_is_rejected() {
        let session = loaded_session().await;
        session.set_git_location("https://host/foo");

        assert_eq!(
            session.add_from_source(ProjectSource::Git),
            Err(WizardError::EmptyLocation {
                project_source: ProjectSource::Git
            })
        );
        assert_eq!(session.summary().git_location, "https://host/foo");
    }

    #[tokio::test]
    async fn adding_selected_templates_resets_selection() {
        let session = loaded_session().await;
        session
            .select_stack(Some("java-default"))
            .expect("stack should exist");
        session.toggle_template("console-java-simple", true);
        assert!(session.summary().templates_selected);

        session
            .add_from_source(ProjectSource::Templates)
            .expect("templates should be added");

        let summary = session.summary();
        assert_eq!(summary.new_templates_number, 0);
        assert!(!summary.templates_selected);
        assert_eq!(
            session.add_from_source(ProjectSource::Templates),
            Err(WizardError::NoTemplatesSelected)
        );
    }

    #[tokio::test]
    async fn template_added_under_other_stack_is_not_offered_again() {
        let session = loaded_session().await;
        session
            .select_stack(Some("java-default"))
            .expect("stack should exist");
        session.toggle_template("console-java-simple", true);
        session
            .select_stack(Some("python-default"))
            .expect("stack should exist");

        assert_eq!(
            session.add_from_source(ProjectSource::Templates),
            Ok(vec!["console-java-simple".to_owned()])
        );
        session
            .select_stack(Some("java-default"))
            .expect("stack should exist");

        let summary = session.summary();
        assert_eq!(summary.new_templates_number, 0);
        assert!(!summary.templates_selected);
        assert_eq!(
            session.add_from_source(ProjectSource::Templates),
            Err(WizardError::NoTemplatesSelected)
        );
    }

    #[tokio::test]
    async fn unknown_stack_is_rejected_before_selection() {
        let session = loaded_session().await;

        assert_eq!(
            session.select_stack(Some("cobol")),
            Err(WizardError::UnknownStack {
                id: "cobol".to_owned()
            })
        );
        assert_eq!(session.summary().stack_id, None);
    }

    #[tokio::test]
    async fn rename_updates_ready_list() {
        let session = loaded_session().await;
        session.set_zip_location("https://host/sample.zip", false);
        session
            .add_from_source(ProjectSource::Zip)
            .expect("zip project should be added");

        session
            .rename_project("sample", "sample-app")
            .expect("rename should succeed");

        let summary = session.summary();
        assert_eq!(summary.ready_to_import[0].name, "sample-app");
        assert_eq!(summary.ready_to_import[0].path, "/sample-app");
        assert_eq!(summary.zip_location, "");
    }

    #[test]
    fn dropping_session_unsubscribes_controllers() {
        let session = WizardSession::new(sample_stacks());
        let bus = session.bus().clone();
        assert_eq!(bus.subscriber_count(), 3);

        drop(session);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
