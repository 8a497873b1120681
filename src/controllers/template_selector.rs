use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::bus::{ProjectTemplateBus, Subscription};
use crate::services::{StackSelectorService, TemplateSelectorService};
use crate::template::registry::{TemplateRegistry, TemplateRegistryError};
use crate::template::{ProjectTemplate, has_matching_tag, lowercase_tags, sort_templates};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: bool,
}

/// Lists templates matching the active stack and tracks which of them the
/// user has checked for import.
pub struct TemplateSelectorController {
    template_selector: Rc<TemplateSelectorService>,
    stack_selector: Rc<StackSelectorService>,
    /// Lower-cased tags of the active stack.
    stack_tags: Vec<String>,
    all_templates: Vec<ProjectTemplate>,
    filtered_templates: Vec<ProjectTemplate>,
    selection: HashMap<String, SelectionState>,
    selected_templates: Vec<ProjectTemplate>,
    new_templates_number: usize,
    _subscriptions: Vec<Subscription>,
}

impl TemplateSelectorController {
    pub fn attach(
        template_selector: Rc<TemplateSelectorService>,
        stack_selector: Rc<StackSelectorService>,
        bus: &ProjectTemplateBus,
    ) -> Rc<RefCell<Self>> {
        let selected_templates = template_selector.templates();
        let controller = Rc::new(RefCell::new(Self {
            template_selector,
            stack_selector: Rc::clone(&stack_selector),
            stack_tags: Vec::new(),
            all_templates: Vec::new(),
            filtered_templates: Vec::new(),
            selection: HashMap::new(),
            selected_templates,
            new_templates_number: 0,
            _subscriptions: Vec::new(),
        }));

        controller.borrow_mut().on_stack_changed();

        let weak = Rc::downgrade(&controller);
        let stack_subscription = stack_selector.subscribe(move || {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().on_stack_changed();
            }
        });

        let weak = Rc::downgrade(&controller);
        let bus_subscription = bus.subscribe(move |template_name: &str| {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().on_project_template_added(template_name);
            }
        });

        controller
            .borrow_mut()
            ._subscriptions
            .extend([stack_subscription, bus_subscription]);
        controller
    }

    /// Fetches the template list and rebuilds the filtered view once it
    /// arrives. The controller is not borrowed while the fetch is in flight.
    pub async fn fetch_templates<R: TemplateRegistry>(
        controller: &Rc<RefCell<Self>>,
        registry: &R,
    ) -> Result<(), TemplateRegistryError> {
        let template_selector = Rc::clone(&controller.borrow().template_selector);
        template_selector.fetch_templates(registry).await?;
        controller.borrow_mut().on_templates_fetched();
        Ok(())
    }

    pub fn on_templates_fetched(&mut self) {
        let mut templates = self.template_selector.all_templates();
        sort_templates(&mut templates);
        self.all_templates = templates;
        self.filter_and_sort_templates();
    }

    pub fn on_stack_changed(&mut self) {
        let Some(stack_id) = self.stack_selector.stack_id() else {
            return;
        };

        self.stack_tags = self
            .stack_selector
            .stack_by_id(&stack_id)
            .map(|stack| lowercase_tags(&stack.tags))
            .unwrap_or_default();
        debug!(stack_id = %stack_id, tags = ?self.stack_tags, "stack changed");

        self.filter_and_sort_templates();
        self.update_number_of_selected_templates();
    }

    /// Narrows the sorted template list to those sharing a tag with the
    /// active stack. Without stack tags the previous filtered list stays.
    pub fn filter_and_sort_templates(&mut self) {
        if !self.stack_tags.is_empty() {
            self.filtered_templates = self
                .all_templates
                .iter()
                .filter(|template| has_matching_tag(template, &self.stack_tags))
                .cloned()
                .collect();
        }

        self.set_list();
        for template in &self.selected_templates {
            if let Some(state) = self.selection.get_mut(&template.name) {
                state.selected = true;
            }
        }
    }

    pub fn on_template_clicked(&mut self, template_name: &str, is_checked: bool) {
        match self.selection.get_mut(template_name) {
            Some(state) => state.selected = is_checked,
            None => debug!(template = template_name, "ignoring click on unlisted template"),
        }

        self.selected_templates = self.selected_items();
        self.template_selector
            .on_templates_selected(self.selected_templates.clone());
        self.update_number_of_selected_templates();
    }

    /// Unchecks a template once it reaches the ready-to-import list. The
    /// template may currently be hidden by the stack filter.
    pub fn on_project_template_added(&mut self, project_template_name: &str) {
        let listed = match self.selection.get_mut(project_template_name) {
            Some(state) => {
                state.selected = false;
                true
            }
            None => false,
        };
        let was_selected = self
            .selected_templates
            .iter()
            .any(|template| template.name == project_template_name);
        if !listed && !was_selected {
            return;
        }

        self.selected_templates
            .retain(|template| template.name != project_template_name);
        self.template_selector
            .on_templates_selected(self.selected_templates.clone());
        self.update_number_of_selected_templates();
    }

    pub fn is_template_selected(new_templates_number: i64) -> bool {
        new_templates_number > 0
    }

    pub fn update_number_of_selected_templates(&mut self) {
        self.new_templates_number = self.selected_items().len();
    }

    pub fn new_templates_number(&self) -> usize {
        self.new_templates_number
    }

    pub fn filtered_templates(&self) -> &[ProjectTemplate] {
        &self.filtered_templates
    }

    pub fn selected_templates(&self) -> &[ProjectTemplate] {
        &self.selected_templates
    }

    pub fn is_selected(&self, template_name: &str) -> bool {
        self.selection
            .get(template_name)
            .is_some_and(|state| state.selected)
    }

    /// Keeps selection entries of templates still listed and adds unselected
    /// entries for new ones.
    fn set_list(&mut self) {
        let mut selection = HashMap::with_capacity(self.filtered_templates.len());
        for template in &self.filtered_templates {
            let state = self
                .selection
                .get(&template.name)
                .copied()
                .unwrap_or_default();
            selection.insert(template.name.clone(), state);
        }
        self.selection = selection;
    }

    fn selected_items(&self) -> Vec<ProjectTemplate> {
        self.filtered_templates
            .iter()
            .filter(|template| self.is_selected(&template.name))
            .cloned()
            .collect()
    }
}
