use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::bus::{ProjectTemplateBus, Subscription};
use crate::services::ZipSourceSettings;
use crate::services::source::{ZIP_EXTENSION, location_refers_to_template};

/// Binds the Zip archive location and the skip-root-folder flag to their
/// settings object.
pub struct ImportZipProjectController<S: ZipSourceSettings> {
    settings: Rc<S>,
    location: String,
    skip_first_level: bool,
    _subscription: Option<Subscription>,
}

impl<S: ZipSourceSettings + 'static> ImportZipProjectController<S> {
    pub fn attach(settings: Rc<S>, bus: &ProjectTemplateBus) -> Rc<RefCell<Self>> {
        let location = settings.location();
        let skip_first_level = settings.skip_first_level();
        let controller = Rc::new(RefCell::new(Self {
            settings,
            location,
            skip_first_level,
            _subscription: None,
        }));

        let weak = Rc::downgrade(&controller);
        let subscription = bus.subscribe(move |template_name: &str| {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().clear_fields(template_name);
            }
        });
        controller.borrow_mut()._subscription = Some(subscription);

        controller
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn skip_first_level(&self) -> bool {
        self.skip_first_level
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
        self.on_changed();
    }

    pub fn set_skip_first_level(&mut self, skip_first_level: bool) {
        self.skip_first_level = skip_first_level;
        self.on_changed();
    }

    pub fn clear_fields(&mut self, project_template_name: &str) {
        if !location_refers_to_template(&self.location, project_template_name, ZIP_EXTENSION) {
            return;
        }

        debug!(
            template = project_template_name,
            location = %self.location,
            "clearing zip source consumed by ready-to-import list"
        );
        self.location.clear();
        self.skip_first_level = false;
        self.on_changed();
    }

    pub fn on_changed(&self) {
        self.settings
            .on_changed(&self.location, self.skip_first_level);
    }
}
