use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ExtractorConfig
// ---------------------------------------------------------------------------

/// Where and how to reach the external text-understanding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor_url")]
    pub base_url: String,
    /// Bounded request timeout; an extraction call never hangs.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the service API key, if any.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_extractor_url() -> String {
    "http://localhost:8091".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: default_extractor_url(),
            timeout_secs: default_timeout_secs(),
            api_key_env: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionEntry
// ---------------------------------------------------------------------------

/// Static token → user binding. Session issuance itself is an external
/// collaborator; the server only consumes tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub token: String,
    pub user: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
}

fn default_port() -> u16 {
    8717
}

fn default_data_path() -> PathBuf {
    PathBuf::from("minutes.redb")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_path: default_data_path(),
            extractor: ExtractorConfig::default(),
            sessions: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.extractor.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "extractor.timeout_secs must be at least 1".into(),
            });
        }
        if self.sessions.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no sessions configured; a token will be minted at startup".into(),
            });
        }
        for entry in &self.sessions {
            if entry.token.len() < 16 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("session token for '{}' is shorter than 16 chars", entry.user),
                });
            }
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
