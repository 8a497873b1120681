use crate::services::ProjectSource;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("project template must have a name before its metadata can be edited")]
    MissingTemplateName,

    #[error("invalid project name `{name}`")]
    InvalidProjectName { name: String },

    #[error("project `{name}` is already in the ready-to-import list")]
    DuplicateProjectName { name: String },

    #[error("project `{name}` is not in the ready-to-import list")]
    UnknownProject { name: String },

    #[error("{project_source} location is empty or does not name a project")]
    EmptyLocation { project_source: ProjectSource },

    #[error("no project templates are selected")]
    NoTemplatesSelected,

    #[error("unknown stack `{id}`")]
    UnknownStack { id: String },
}
