use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use tracing::debug;

use crate::template::{ProjectSourceLocation, ProjectTemplate, SKIP_FIRST_LEVEL_PARAMETER};

pub const GIT_EXTENSION: &str = ".git";
pub const ZIP_EXTENSION: &str = ".zip";

/// Settings object behind the Git import field.
pub trait GitSourceSettings {
    fn location(&self) -> String;
    fn on_location_changed(&self, location: &str);
}

/// Settings object behind the Zip import fields.
pub trait ZipSourceSettings {
    fn location(&self) -> String;
    fn skip_first_level(&self) -> bool;
    fn on_changed(&self, location: &str, skip_first_level: bool);
}

#[derive(Debug, Default)]
pub struct GitImportService {
    location: RefCell<String>,
}

impl GitImportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template for the repository at the current location, if any.
    pub fn project_template(&self) -> Option<ProjectTemplate> {
        let location = self.location.borrow();
        let name = project_name_from_location(&location, GIT_EXTENSION)?;

        Some(ProjectTemplate {
            display_name: name.clone(),
            path: format!("/{name}"),
            name,
            project_type: "blank".to_owned(),
            category: "git".to_owned(),
            source: Some(ProjectSourceLocation {
                kind: "git".to_owned(),
                location: location.trim().to_owned(),
                parameters: BTreeMap::new(),
            }),
            ..ProjectTemplate::default()
        })
    }
}

impl GitSourceSettings for GitImportService {
    fn location(&self) -> String {
        self.location.borrow().clone()
    }

    fn on_location_changed(&self, location: &str) {
        debug!(location, "git location changed");
        *self.location.borrow_mut() = location.to_owned();
    }
}

#[derive(Debug, Default)]
pub struct ZipImportService {
    location: RefCell<String>,
    skip_first_level: Cell<bool>,
}

impl ZipImportService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_template(&self) -> Option<ProjectTemplate> {
        let location = self.location.borrow();
        let name = project_name_from_location(&location, ZIP_EXTENSION)?;

        let mut parameters = BTreeMap::new();
        if self.skip_first_level.get() {
            parameters.insert(SKIP_FIRST_LEVEL_PARAMETER.to_owned(), "true".to_owned());
        }

        Some(ProjectTemplate {
            display_name: name.clone(),
            path: format!("/{name}"),
            name,
            project_type: "blank".to_owned(),
            category: "zip".to_owned(),
            source: Some(ProjectSourceLocation {
                kind: "zip".to_owned(),
                location: location.trim().to_owned(),
                parameters,
            }),
            ..ProjectTemplate::default()
        })
    }
}

impl ZipSourceSettings for ZipImportService {
    fn location(&self) -> String {
        self.location.borrow().clone()
    }

    fn skip_first_level(&self) -> bool {
        self.skip_first_level.get()
    }

    fn on_changed(&self, location: &str, skip_first_level: bool) {
        debug!(location, skip_first_level, "zip source changed");
        *self.location.borrow_mut() = location.to_owned();
        self.skip_first_level.set(skip_first_level);
    }
}

/// Project name implied by an archive or repository location: the last path
/// segment with `extension` removed. Locations whose last segment does not
/// end in `extension` name no project.
pub fn project_name_from_location(location: &str, extension: &str) -> Option<String> {
    let trimmed = location.trim().trim_end_matches('/');
    let last_segment = trimmed.rsplit(['/', ':']).next()?;
    if last_segment.len() == trimmed.len() {
        return None;
    }

    match last_segment.strip_suffix(extension) {
        Some(name) if !name.is_empty() => Some(name.to_owned()),
        _ => None,
    }
}

/// True when `location` names the project `template_name`, i.e. it would
/// produce a template of that name when added. Blank names and names holding
/// a path separator never match.
pub fn location_refers_to_template(location: &str, template_name: &str, extension: &str) -> bool {
    let template_name = template_name.trim();
    if template_name.is_empty() || template_name.contains(['/', ':']) {
        return false;
    }

    project_name_from_location(location, extension).as_deref() == Some(template_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_strips_extension_from_last_segment() {
        assert_eq!(
            project_name_from_location("https://github.com/eclipse/che.git", GIT_EXTENSION),
            Some("che".to_owned())
        );
        assert_eq!(
            project_name_from_location("git@github.com:che-samples/console.git", GIT_EXTENSION),
            Some("console".to_owned())
        );
        assert_eq!(
            project_name_from_location("https://host/archive/sample.zip/", ZIP_EXTENSION),
            Some("sample".to_owned())
        );
    }

    #[test]
    fn project_name_requires_a_path() {
        assert_eq!(project_name_from_location("", GIT_EXTENSION), None);
        assert_eq!(project_name_from_location("   ", GIT_EXTENSION), None);
        assert_eq!(project_name_from_location("plain", GIT_EXTENSION), None);
        assert_eq!(project_name_from_location("https://host/.git", GIT_EXTENSION), None);
        assert_eq!(project_name_from_location("plain.git", GIT_EXTENSION), None);
    }

    #[test]
    fn project_name_requires_the_extension() {
        assert_eq!(project_name_from_location("https://host/foo", GIT_EXTENSION), None);
        assert_eq!(project_name_from_location("https://host/foo.git", ZIP_EXTENSION), None);
    }

    #[test]
    fn location_match_agrees_with_derived_name() {
        for location in ["https://host/foo.git", "git@host:foo.git", "git@host:team/foo.git/"] {
            let name = project_name_from_location(location, GIT_EXTENSION)
                .expect("location should name a project");
            assert!(location_refers_to_template(location, &name, GIT_EXTENSION), "{location}");
        }
    }

    #[test]
    fn location_match_is_a_suffix_check() {
        assert!(location_refers_to_template("https://host/foo.git", "foo", GIT_EXTENSION));
        assert!(!location_refers_to_template("https://host/foo.git/extra", "foo", GIT_EXTENSION));
        assert!(!location_refers_to_template("https://host/barfoo.git", "foo", GIT_EXTENSION));
        assert!(!location_refers_to_template("https://host/bar.zip", "foo", ZIP_EXTENSION));
    }

    #[test]
    fn location_match_treats_pattern_characters_literally() {
        assert!(!location_refers_to_template("https://host/foo.git", ".*", GIT_EXTENSION));
        assert!(!location_refers_to_template("https://host/fooXgit", "foo", GIT_EXTENSION));
        assert!(!location_refers_to_template("https://host/a/b.git", "a/b", GIT_EXTENSION));
        assert!(!location_refers_to_template("https://host/.git", "", GIT_EXTENSION));
    }

    #[test]
    fn zip_template_records_skip_first_level() {
        let service = ZipImportService::new();
        service.on_changed("https://host/sample.zip", true);

        let template = service.project_template().expect("template should be built");
        assert_eq!(template.name, "sample");
        let source = template.source.expect("source should be set");
        assert_eq!(source.kind, "zip");
        assert_eq!(
            source.parameters.get(SKIP_FIRST_LEVEL_PARAMETER).map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn git_template_absent_without_location() {
        let service = GitImportService::new();
        assert_eq!(service.project_template(), None);
    }
}
