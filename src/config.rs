use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::external::{SshCommand, SshFlavor};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to load .env file: {0}")]
    Env(#[from] dotenvy::Error),
}

/// Application settings for gitkeeper
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where credentials and tracked repositories are persisted
    pub store_path: PathBuf,
    /// SSH client selection
    pub ssh: SshConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    /// auto, openssh or plink
    pub flavor: SshFlavor,
    pub sshpass_program: String,
    pub ssh_program: String,
    pub plink_program: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human readable logs
    pub json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("conf.toml"),
            ssh: SshConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        let command = SshCommand::default();
        Self {
            flavor: SshFlavor::Auto,
            sshpass_program: command.sshpass_program,
            ssh_program: command.ssh_program,
            plink_program: command.plink_program,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl SshConfig {
    pub fn command(&self) -> SshCommand {
        SshCommand {
            flavor: self.flavor.resolve(),
            sshpass_program: self.sshpass_program.clone(),
            ssh_program: self.ssh_program.clone(),
            plink_program: self.plink_program.clone(),
        }
    }
}

impl Settings {
    /// Load settings from multiple sources with precedence:
    /// 1. Default values
    /// 2. `gitkeeper.toml` in the working directory
    /// 3. Environment variables (prefixed with GITKEEPER_, `__` between sections)
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(Path::new("gitkeeper.toml"))
    }

    pub fn load_from(file: &Path) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if file.exists() {
            builder = builder.add_source(File::from(file));
        }

        builder = builder.add_source(
            Environment::with_prefix("GITKEEPER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<(), SettingsError> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
