use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

pub use config::ConfigError;

use crate::batch::BatchSettings;
use crate::credentials::{CredentialMap, SenderCredential};
use crate::mail::MailerConfig;

pub const ENV_PREFIX: &str = "PHOTOMAIL";
pub const CONFIG_PATH_VAR: &str = "PHOTOMAIL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "photomail.toml";

/// Process-wide settings, loaded once at start-up.
///
/// Sources in increasing precedence: defaults, the TOML file, `PHOTOMAIL_*`
/// environment variables (`__` separates nested keys, e.g. `PHOTOMAIL_SMTP__HOST`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_attachment_prefix")]
    pub attachment_prefix: String,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default)]
    pub smtp: MailerConfig,

    /// Senders whose password comes from an environment variable.
    #[serde(default)]
    pub sender_credentials: Vec<SenderCredential>,
}

fn default_port() -> u16 {
    3030
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_attachment_prefix() -> String {
    BatchSettings::default().attachment_prefix
}

fn default_subject() -> String {
    BatchSettings::default().subject
}

impl AppConfig {
    /// Load from `$PHOTOMAIL_CONFIG` (or `photomail.toml`) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Load from `path`, which may be missing, overlaid with the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(
            config::Config::builder()
                .add_source(File::from(path).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::build(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn credential_map(&self) -> CredentialMap {
        CredentialMap::new(self.sender_credentials.iter().cloned())
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            subject: self.subject.clone(),
            attachment_prefix: self.attachment_prefix.clone(),
        }
    }
}
