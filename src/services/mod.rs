//! Collaborators the wizard controllers talk to. All of them live on the UI
//! thread and are shared through `Rc`; mutation goes through interior cells so
//! a bus handler can call back into any service.

pub mod project_source;
pub mod selector;
pub mod source;

pub use self::project_source::{ProjectSource, ProjectSourceSelectorService};
pub use self::selector::{ProjectMetadataService, StackSelectorService, TemplateSelectorService};
pub use self::source::{GitImportService, GitSourceSettings, ZipImportService, ZipSourceSettings};
