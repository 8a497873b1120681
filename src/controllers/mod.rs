pub mod import_git;
pub mod import_zip;
pub mod metadata;
pub mod template_selector;

pub use self::import_git::ImportGitProjectController;
pub use self::import_zip::ImportZipProjectController;
pub use self::metadata::ProjectMetadataController;
pub use self::template_selector::{SelectionState, TemplateSelectorController};
