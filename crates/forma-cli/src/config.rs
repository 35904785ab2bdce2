//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `FORMA_*` environment variables, `__` separating sections
//!    (`FORMA_NAMING__ORGANIZATION_NAME=Acme`)
//! 3. Config file (`--config`, else the platform default path if present)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "FORMA";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default naming facts.
    pub naming: NamingConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Descriptor discovery.
    pub templates: TemplateConfig,
}

/// Facts that rarely change between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub organization_name: Option<String>,
    pub full_user_name: Option<String>,
    /// Falls back to `$USER` / `$USERNAME`.
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Descriptor directory used when `--templates` is not given.
    pub dir: Option<PathBuf>,
    /// Reject unreadable descriptor files instead of skipping them.
    pub strict: bool,
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// An explicit `config_file` must exist; the default path is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("failed to encode default config")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        config
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.forma.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "forma", "forma")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".forma.toml"))
    }

    /// User name from config, else the login name from the environment.
    pub fn user_name(&self) -> Option<String> {
        self.naming
            .user_name
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_have_no_templates_dir() {
        let cfg = AppConfig::default();
        assert!(cfg.templates.dir.is_none());
        assert!(!cfg.templates.strict);
        assert_eq!(cfg.output.format, "human");
    }

    #[test]
    fn missing_optional_file_returns_defaults() {
        let cfg = AppConfig::load_from(Path::new("/does/not/exist.toml"), false).unwrap();
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn missing_explicit_file_is_error() {
        assert!(AppConfig::load_from(Path::new("/does/not/exist.toml"), true).is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("forma.toml");
        fs::write(
            &path,
            "[naming]\norganization_name = \"Acme\"\n\n[templates]\ndir = \"/srv/templates\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path, true).unwrap();
        assert_eq!(cfg.naming.organization_name.as_deref(), Some("Acme"));
        assert_eq!(cfg.templates.dir, Some(PathBuf::from("/srv/templates")));
        assert_eq!(cfg.output.format, "human");
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
