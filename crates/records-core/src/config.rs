use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::catalog::DepartmentId;
use super::request_builder::DeliveryOptions;
use super::request_builder::Priority;
use super::request_builder::RequestType;
use super::state::Requester;

pub const ENV_RECORDS_CONFIG: &str = "RECORDS_CONFIG";

const DEFAULT_CATALOG_PATH: &str = "catalog.yaml";
const DEFAULT_JOURNAL_PATH: &str = ".records/journal.jsonl";
const DEFAULT_LOG_PATH: &str = ".records/records.log";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("RECORDS_CONFIG contained invalid UTF-8")]
    InvalidEnv,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub requester: RequesterConfig,
    pub delivery: DeliveryConfig,
    pub journal: JournalConfig,
    pub submission: SubmissionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequesterConfig {
    pub name: String,
    pub departments: Vec<DepartmentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub request_type: RequestType,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub path: PathBuf,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_JOURNAL_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Batches are written here when set; otherwise they are simulated.
    pub drop_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    pub fn requester(&self) -> Requester {
        Requester {
            name: self.requester.name.clone(),
            departments: self.requester.departments.clone(),
        }
    }

    pub fn default_delivery(&self) -> DeliveryOptions {
        DeliveryOptions {
            request_type: self.delivery.request_type,
            priority: self.delivery.priority,
            instructions: String::new(),
        }
    }
}

/// Picks the config file to read: an explicit path, then
/// `$RECORDS_CONFIG`, then `fallback` if that file exists.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    fallback: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    match std::env::var(ENV_RECORDS_CONFIG) {
        Ok(raw) if !raw.trim().is_empty() => return Ok(Some(PathBuf::from(raw))),
        Ok(_) | Err(std::env::VarError::NotPresent) => {}
        Err(std::env::VarError::NotUnicode(_)) => return Err(ConfigError::InvalidEnv),
    }
    Ok(fallback.filter(|path| path.is_file()))
}

/// Loads the resolved config, or defaults when no file applies.
pub fn load_config(
    explicit: Option<&Path>,
    fallback: Option<PathBuf>,
) -> Result<Config, ConfigError> {
    match resolve_config_path(explicit, fallback)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Config::load(path)
        }
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::OnceLock;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn with_env_var<F>(value: Option<&str>, test: F)
    where
        F: FnOnce(),
    {
        let _guard = env_lock().lock().expect("env lock");
        let backup = std::env::var(ENV_RECORDS_CONFIG).ok();
        match value {
            Some(value) => std::env::set_var(ENV_RECORDS_CONFIG, value),
            None => std::env::remove_var(ENV_RECORDS_CONFIG),
        }
        test();
        match backup {
            Some(value) => std::env::set_var(ENV_RECORDS_CONFIG, value),
            None => std::env::remove_var(ENV_RECORDS_CONFIG),
        }
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("", Path::new("config.toml")).expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.catalog.path, PathBuf::from("catalog.yaml"));
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.submission.drop_dir, None);
        assert_eq!(config.default_delivery(), DeliveryOptions::default());
    }

    #[test]
    fn full_file_parses_every_section() {
        let raw = r#"
[catalog]
path = "data/catalog.json"

[requester]
name = "Ada"
departments = [1, 2]

[delivery]
request_type = "permanent"
priority = "urgent"

[journal]
path = "state/journal.jsonl"

[submission]
drop_dir = "outbox"

[logging]
path = "state/records.log"
filter = "records_core=debug"
"#;
        let config = Config::from_toml_str(raw, Path::new("config.toml")).expect("parse");
        assert_eq!(config.catalog.path, PathBuf::from("data/catalog.json"));
        assert_eq!(
            config.requester(),
            Requester {
                name: "Ada".to_string(),
                departments: vec![DepartmentId(1), DepartmentId(2)],
            }
        );
        assert_eq!(
            config.default_delivery(),
            DeliveryOptions {
                request_type: RequestType::Permanent,
                priority: Priority::Urgent,
                instructions: String::new(),
            }
        );
        assert_eq!(config.journal.path, PathBuf::from("state/journal.jsonl"));
        assert_eq!(config.submission.drop_dir, Some(PathBuf::from("outbox")));
        assert_eq!(config.logging.filter, "records_core=debug");
    }

    #[test]
    fn invalid_toml_reports_path() {
        let err = Config::from_toml_str("[delivery\n", Path::new("bad.toml"))
            .expect_err("invalid toml");
        assert!(err.to_string().starts_with("failed to parse config bad.toml"));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let err = Config::from_toml_str("[delivery]\npriority = \"whenever\"\n", Path::new("c"))
            .expect_err("bad priority");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_path_wins_over_env() {
        with_env_var(Some("/from/env.toml"), || {
            let resolved =
                resolve_config_path(Some(Path::new("/explicit.toml")), None).expect("resolve");
            assert_eq!(resolved, Some(PathBuf::from("/explicit.toml")));
        });
    }

    #[test]
    fn env_path_is_used_when_set() {
        with_env_var(Some("/from/env.toml"), || {
            let resolved = resolve_config_path(None, None).expect("resolve");
            assert_eq!(resolved, Some(PathBuf::from("/from/env.toml")));
        });
    }

    #[test]
    fn blank_env_falls_back_to_existing_file_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        std::fs::write(&present, "[requester]\nname = \"Ada\"\n").expect("write");

        with_env_var(Some("  "), || {
            assert_eq!(resolve_config_path(None, Some(missing.clone())).expect("resolve"), None);
            let config = load_config(None, Some(present.clone())).expect("load");
            assert_eq!(config.requester.name, "Ada");
        });
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.toml");
        with_env_var(None, || {
            let err = load_config(Some(&path), None).expect_err("missing");
            assert!(matches!(err, ConfigError::Read { .. }));
        });
    }
}
