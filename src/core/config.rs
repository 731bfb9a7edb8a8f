use crate::core::decoder::encoding_for_label;
use crate::core::dirs::get_config_directory;
use crate::core::error::{GitAccessorError, Result};
use crate::core::process::GitProcess;
use crate::core::settings;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Persistent settings, stored as `config.json` in the config directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AccessConfig {
    /// git executable, looked up on `PATH` when not absolute.
    pub git_path: PathBuf,
    pub log_cli_calls: bool,
    /// WHATWG label of the default output encoding.
    pub default_encoding: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            git_path: PathBuf::from("git"),
            log_cli_calls: false,
            default_encoding: "utf-8".to_string(),
        }
    }
}

impl AccessConfig {
    pub fn load_or_create() -> Result<Self> {
        let config_dir = get_config_directory()?;
        if config_dir.join(CONFIG_FILE).exists() {
            Self::load_from(&config_dir)
        } else {
            let config = Self::default();
            config.save_to(&config_dir)?;
            Ok(config)
        }
    }

    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join(CONFIG_FILE);
        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| GitAccessorError::config_read_failed(&config_file, e))?;
        serde_json::from_str(&content)
            .map_err(|e| GitAccessorError::config_parse_failed(&config_file, e))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_directory()?)
    }

    pub fn save_to(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_dir.join(CONFIG_FILE), content)?;
        Ok(())
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        encoding_for_label(&self.default_encoding)
    }

    pub fn process(&self) -> GitProcess {
        GitProcess::new(&self.git_path)
    }

    /// Push the logging toggle and default encoding into the process-wide settings.
    pub fn install(&self) -> Result<()> {
        let encoding = self.encoding()?;
        settings::set_log_cli_calls(self.log_cli_calls);
        if !settings::set_default_encoding(encoding) && settings::default_encoding() != encoding {
            log::warn!(
                "Default encoding already set to {}, ignoring {}",
                settings::default_encoding().name(),
                encoding.name()
            );
        }
        Ok(())
    }
}
