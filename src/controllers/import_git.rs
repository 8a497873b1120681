use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::bus::{ProjectTemplateBus, Subscription};
use crate::services::GitSourceSettings;
use crate::services::source::{GIT_EXTENSION, location_refers_to_template};

/// Binds the Git repository location field to its settings object.
pub struct ImportGitProjectController<S: GitSourceSettings> {
    settings: Rc<S>,
    location: String,
    _subscription: Option<Subscription>,
}

impl<S: GitSourceSettings + 'static> ImportGitProjectController<S> {
    pub fn attach(settings: Rc<S>, bus: &ProjectTemplateBus) -> Rc<RefCell<Self>> {
        let location = settings.location();
        let controller = Rc::new(RefCell::new(Self {
            settings,
            location,
            _subscription: None,
        }));

        let weak = Rc::downgrade(&controller);
        let subscription = bus.subscribe(move |template_name: &str| {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().clear_field(template_name);
            }
        });
        controller.borrow_mut()._subscription = Some(subscription);

        controller
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// View binding: stores the typed location and pushes it.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
        self.on_changed();
    }

    /// Empties the field when it points at the repository of
    /// `project_template_name`.
    pub fn clear_field(&mut self, project_template_name: &str) {
        if !location_refers_to_template(&self.location, project_template_name, GIT_EXTENSION) {
            return;
        }

        debug!(
            template = project_template_name,
            location = %self.location,
            "clearing git location consumed by ready-to-import list"
        );
        self.location.clear();
        self.on_changed();
    }

    pub fn on_changed(&self) {
        self.settings.on_location_changed(&self.location);
    }
}
