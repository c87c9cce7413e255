//! Wizard configuration.
//!
//! Loaded from TOML. Every key is optional; omitted keys take the defaults
//! shown here:
//!
//! ```toml
//! endpoint = "https://collect.example.com/feedback"
//! user_agent = "kudos-engine/0.1.0"
//! referrer = ""
//! draft_key = "kudos_testimonial_draft"
//! debounce_ms = 3000
//! draft_notice_ms = 2000
//! draft_ttl_hours = 24
//! max_upload_bytes = 5242880
//! require_complete = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use kudos_storage::DEFAULT_DRAFT_KEY;

use crate::submit::ClientContext;
use crate::upload::MAX_UPLOAD_BYTES;

/// A century. Anything longer is a typo.
const MAX_DRAFT_TTL_HOURS: u64 = 24 * 365 * 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Collection endpoint the submission is POSTed to.
    pub endpoint: String,
    /// Passed through verbatim in the submission body.
    pub user_agent: String,
    /// Passed through verbatim in the submission body.
    pub referrer: String,
    /// Storage key of the single draft slot.
    pub draft_key: String,
    /// Quiet period after the last deep-dive edit before the draft is written.
    pub debounce_ms: u64,
    /// How long the "draft saved" notice stays up.
    pub draft_notice_ms: u64,
    /// Drafts at least this old are ignored on startup.
    pub draft_ttl_hours: u64,
    pub max_upload_bytes: u64,
    /// Refuse to submit while a required answer is missing or invalid.
    pub require_complete: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        WizardConfig {
            endpoint: String::new(),
            user_agent: format!("kudos-engine/{}", env!("CARGO_PKG_VERSION")),
            referrer: String::new(),
            draft_key: DEFAULT_DRAFT_KEY.to_string(),
            debounce_ms: 3_000,
            draft_notice_ms: 2_000,
            draft_ttl_hours: 24,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            require_complete: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl WizardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WizardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.endpoint.trim().is_empty() {
            problems.push("endpoint must be set".to_string());
        }
        if self.debounce_ms == 0 {
            problems.push("debounce_ms must be greater than zero".to_string());
        }
        if self.draft_ttl_hours == 0 || self.draft_ttl_hours > MAX_DRAFT_TTL_HOURS {
            problems.push(format!(
                "draft_ttl_hours must be between 1 and {}",
                MAX_DRAFT_TTL_HOURS
            ));
        }
        if let Err(e) = kudos_storage::check_key(&self.draft_key) {
            problems.push(e.to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn draft_notice(&self) -> Duration {
        Duration::from_millis(self.draft_notice_ms)
    }

    pub fn draft_ttl(&self) -> time::Duration {
        let hours = self.draft_ttl_hours.min(MAX_DRAFT_TTL_HOURS);
        time::Duration::hours(hours as i64)
    }

    pub fn client_context(&self) -> ClientContext {
        ClientContext {
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
        }
    }
}

/// Read and validate a TOML config file from `path`.
pub fn read_config(path: &Path) -> Result<WizardConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    WizardConfig::from_toml_str(&content)
}
