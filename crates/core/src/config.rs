use std::env;
use std::path::PathBuf;

use crate::error::Result;
use crate::recipients::PhonePolicy;
use crate::schedule::{MessageTemplate, DEFAULT_FOOTER, DEFAULT_HEADER};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub storage: StorageConfig,
    pub message: MessageConfig,
    pub sms: SmsConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PEDIBUS_PROFILE`. When set (e.g. `SCHOOL2`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PEDIBUS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            storage: StorageConfig::from_env_profiled(p),
            message: MessageConfig::from_env_profiled(p),
            sms: SmsConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() {
            "default"
        } else {
            &self.profile
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  guides:   {}", self.storage.guides_path().display());
        tracing::info!("  history:  {}", self.storage.history_path().display());
        tracing::info!(
            "  sms:      prefix={}, gateway={}",
            self.sms.phone_prefix,
            if self.sms.is_configured() {
                "configured"
            } else {
                "(none)"
            }
        );
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub guides_file: String,
    pub history_file: String,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        let data_dir = profiled_env_opt(p, "DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        Self {
            data_dir,
            guides_file: profiled_env_or(p, "GUIDES_FILE", "guides.txt"),
            history_file: profiled_env_or(p, "HISTORY_FILE", "histo.txt"),
        }
    }

    pub fn guides_path(&self) -> PathBuf {
        self.data_dir.join(&self.guides_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Pedibus"))
        .unwrap_or_else(|| PathBuf::from("Pedibus"))
}

// ── Message ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MessageConfig {
    pub header: String,
    pub footer: String,
}

impl MessageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            header: profiled_env_or(p, "MESSAGE_HEADER", DEFAULT_HEADER),
            footer: profiled_env_or(p, "MESSAGE_FOOTER", DEFAULT_FOOTER),
        }
    }

    pub fn template(&self) -> MessageTemplate {
        MessageTemplate {
            header: self.header.clone(),
            footer: self.footer.clone(),
        }
    }
}

// ── SMS gateway ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Leading digits of a valid mobile number.
    pub phone_prefix: String,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
}

impl SmsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            phone_prefix: profiled_env_or(p, "PHONE_PREFIX", "06"),
            webhook_url: profiled_env_opt(p, "SMS_WEBHOOK_URL"),
            webhook_token: profiled_env_opt(p, "SMS_WEBHOOK_TOKEN"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub fn phone_policy(&self) -> Result<PhonePolicy> {
        PhonePolicy::new(&self.phone_prefix)
    }
}
