use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use tracing::debug;

use super::ProjectTemplate;
use crate::config::TemplatesSource;

#[derive(Debug, thiserror::Error)]
pub enum TemplateRegistryError {
    #[error("failed to read templates file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse templates from {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("template registry returned HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Source of the full template list shown by the template selector.
pub trait TemplateRegistry {
    fn fetch_templates(
        &self,
    ) -> impl Future<Output = Result<Vec<ProjectTemplate>, TemplateRegistryError>>;
}

#[derive(Debug, Clone)]
pub struct FileTemplateRegistry {
    path: PathBuf,
}

impl FileTemplateRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateRegistry for FileTemplateRegistry {
    async fn fetch_templates(&self) -> Result<Vec<ProjectTemplate>, TemplateRegistryError> {
        debug!(path = %self.path.display(), "reading templates file");

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| TemplateRegistryError::Io {
                path: self.path.clone(),
                source,
            })?;

        parse_templates(&raw, &self.path.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct HttpTemplateRegistry {
    http_client: reqwest::Client,
    url: Url,
}

impl HttpTemplateRegistry {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TemplateRegistryError> {
        let url = Url::parse(url).map_err(|error| {
            TemplateRegistryError::Configuration(format!("invalid templates URL `{url}`: {error}"))
        })?;
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http_client, url })
    }
}

impl TemplateRegistry for HttpTemplateRegistry {
    async fn fetch_templates(&self) -> Result<Vec<ProjectTemplate>, TemplateRegistryError> {
        debug!(url = %self.url, "requesting templates");

        let response = self.http_client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error response body>".to_owned());
            return Err(TemplateRegistryError::HttpStatus { status, body });
        }

        let raw = response.text().await?;
        parse_templates(&raw, self.url.as_str())
    }
}

/// Registry chosen from configuration.
#[derive(Debug, Clone)]
pub enum AnyTemplateRegistry {
    File(FileTemplateRegistry),
    Http(HttpTemplateRegistry),
}

impl AnyTemplateRegistry {
    pub fn from_source(
        source: &TemplatesSource,
        timeout: Duration,
    ) -> Result<Self, TemplateRegistryError> {
        match source {
            TemplatesSource::File(path) => Ok(Self::File(FileTemplateRegistry::new(path.clone()))),
            TemplatesSource::Http(url) => Ok(Self::Http(HttpTemplateRegistry::new(url, timeout)?)),
        }
    }
}

impl TemplateRegistry for AnyTemplateRegistry {
    async fn fetch_templates(&self) -> Result<Vec<ProjectTemplate>, TemplateRegistryError> {
        match self {
            Self::File(registry) => registry.fetch_templates().await,
            Self::Http(registry) => registry.fetch_templates().await,
        }
    }
}

fn parse_templates(raw: &str, origin: &str) -> Result<Vec<ProjectTemplate>, TemplateRegistryError> {
    let templates = serde_yaml::from_str::<Vec<ProjectTemplate>>(raw).map_err(|error| {
        TemplateRegistryError::Parse {
            origin: origin.to_owned(),
            reason: error.to_string(),
        }
    })?;

    if let Some(unnamed) = templates.iter().position(|template| template.name.trim().is_empty()) {
        return Err(TemplateRegistryError::Parse {
            origin: origin.to_owned(),
            reason: format!("template at index {unnamed} has no name"),
        });
    }

    Ok(templates)
}
