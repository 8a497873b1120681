use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::bus::{NotificationBus, Subscription};
use crate::template::registry::{TemplateRegistry, TemplateRegistryError};
use crate::template::{ProjectTemplate, Stack};

/// Holds the fetched template list and the templates currently chosen for
/// import.
#[derive(Debug, Default)]
pub struct TemplateSelectorService {
    all_templates: RefCell<Vec<ProjectTemplate>>,
    selected: RefCell<Vec<ProjectTemplate>>,
}

impl TemplateSelectorService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full template list with what `registry` returns. On
    /// failure the previous list is kept and the error is returned.
    pub async fn fetch_templates<R: TemplateRegistry>(
        &self,
        registry: &R,
    ) -> Result<(), TemplateRegistryError> {
        match registry.fetch_templates().await {
            Ok(templates) => {
                info!(count = templates.len(), "fetched project templates");
                *self.all_templates.borrow_mut() = templates;
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "failed to fetch project templates");
                Err(error)
            }
        }
    }

    pub fn all_templates(&self) -> Vec<ProjectTemplate> {
        self.all_templates.borrow().clone()
    }

    pub fn templates(&self) -> Vec<ProjectTemplate> {
        self.selected.borrow().clone()
    }

    pub fn on_templates_selected(&self, templates: Vec<ProjectTemplate>) {
        debug!(count = templates.len(), "template selection changed");
        *self.selected.borrow_mut() = templates;
    }
}

/// Tracks the active stack and notifies subscribers when it changes.
#[derive(Default)]
pub struct StackSelectorService {
    stacks: BTreeMap<String, Stack>,
    stack_id: RefCell<Option<String>>,
    changes: NotificationBus<()>,
}

impl StackSelectorService {
    pub fn new(stacks: impl IntoIterator<Item = Stack>) -> Self {
        Self {
            stacks: stacks
                .into_iter()
                .map(|stack| (stack.id.clone(), stack))
                .collect(),
            stack_id: RefCell::new(None),
            changes: NotificationBus::new(),
        }
    }

    pub fn stack_id(&self) -> Option<String> {
        self.stack_id.borrow().clone()
    }

    pub fn stack_by_id(&self, id: &str) -> Option<Stack> {
        self.stacks.get(id).cloned()
    }

    /// Makes `stack_id` the active stack and notifies subscribers. The id is
    /// not checked against known stacks; an unknown id reads back as a stack
    /// without tags.
    pub fn select_stack(&self, stack_id: Option<&str>) {
        *self.stack_id.borrow_mut() = stack_id.map(str::to_owned);
        debug!(stack_id, "stack selected");
        self.changes.publish(&());
    }

    pub fn subscribe<F>(&self, mut handler: F) -> Subscription
    where
        F: FnMut() + 'static,
    {
        self.changes.subscribe(move |_: &()| handler())
    }
}

/// Receives the metadata of the project template being edited.
#[derive(Debug, Default)]
pub struct ProjectMetadataService {
    template: RefCell<Option<ProjectTemplate>>,
}

impl ProjectMetadataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_metadata_changed(&self, template: &ProjectTemplate) {
        debug!(name = %template.name, "project metadata changed");
        *self.template.borrow_mut() = Some(template.clone());
    }

    pub fn template(&self) -> Option<ProjectTemplate> {
        self.template.borrow().clone()
    }
}
