use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

const MAX_DELAY_MS: u64 = 5000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Pause after a finished word before the next one is shown.
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    /// How long the "incorrect" flash stays on screen.
    #[serde(default = "default_error_flash_ms")]
    pub error_flash_ms: u64,
    #[serde(default)]
    pub student: String,
    #[serde(default = "default_pack_dir")]
    pub pack_dir: String,
    /// JSON word table to read instead of the bundled sample.
    #[serde(default)]
    pub word_table: Option<String>,
    /// Pack server to fetch curriculums from.
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub default_curriculum: Option<String>,
}

fn default_advance_delay_ms() -> u64 {
    300
}
fn default_error_flash_ms() -> u64 {
    500
}
fn default_pack_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hankey")
        .join("packs")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            advance_delay_ms: default_advance_delay_ms(),
            error_flash_ms: default_error_flash_ms(),
            student: String::new(),
            pack_dir: default_pack_dir(),
            word_table: None,
            remote_url: None,
            default_curriculum: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing file means defaults; a file that does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hankey")
            .join("config.toml")
    }

    /// Clamp delays and drop blank optional settings.
    pub fn validate(&mut self) {
        self.advance_delay_ms = self.advance_delay_ms.min(MAX_DELAY_MS);
        self.error_flash_ms = self.error_flash_ms.min(MAX_DELAY_MS);
        for field in [
            &mut self.word_table,
            &mut self.remote_url,
            &mut self.default_curriculum,
        ] {
            if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *field = None;
            }
        }
        if self.pack_dir.trim().is_empty() {
            self.pack_dir = default_pack_dir();
        }
    }
}
