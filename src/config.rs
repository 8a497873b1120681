use std::env;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, ensure};

pub const DEFAULT_TEMPLATES_SOURCE: &str = "templates.yaml";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_FILE_LOG_FILTER: &str = "debug";

/// Where the template list is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatesSource {
    File(PathBuf),
    Http(String),
}

impl Display for TemplatesSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
        }
    }
}

impl FromStr for TemplatesSource {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(anyhow!("templates source cannot be empty"));
        }

        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Http(value.to_owned()))
        } else {
            Ok(Self::File(PathBuf::from(value)))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSettings {
    pub templates_source: TemplatesSource,
    pub stacks_file: Option<PathBuf>,
    pub fetch_timeout_ms: u64,
    pub log_dir: Option<PathBuf>,
    pub file_log_filter: String,
}

impl WizardSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();

        let templates_source = env::var("WIZARD_TEMPLATES_SOURCE")
            .unwrap_or_else(|_| DEFAULT_TEMPLATES_SOURCE.to_owned())
            .parse::<TemplatesSource>()
            .context("failed to parse WIZARD_TEMPLATES_SOURCE")?;

        let stacks_file = read_optional_env("WIZARD_STACKS_FILE").map(PathBuf::from);

        let fetch_timeout_ms = parse_u64_env("WIZARD_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?;
        ensure!(
            fetch_timeout_ms > 0,
            "WIZARD_FETCH_TIMEOUT_MS must be greater than 0"
        );

        let log_dir = read_optional_env("WIZARD_LOG_DIR").map(PathBuf::from);
        let file_log_filter = read_optional_env("WIZARD_FILE_LOG")
            .unwrap_or_else(|| DEFAULT_FILE_LOG_FILTER.to_owned());

        Ok(Self {
            templates_source,
            stacks_file,
            fetch_timeout_ms,
            log_dir,
            file_log_filter,
        })
    }
}

fn read_optional_env(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}

fn parse_u64_env(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("failed to parse {name} as u64")),
        Err(_) => Ok(default),
    }
}
