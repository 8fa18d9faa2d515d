use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::services::{WithdrawalPolicy, DEFAULT_REMINDER_COUNT};
use crate::storage::json_backend::write_atomic;

/// Overrides the application home directory.
pub const HOME_ENV: &str = "GOAL_SAVINGS_HOME";

const APP_DIR: &str = "goal_savings";
const CONFIG_FILE: &str = "config.json";
const DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] crate::errors::SavingsError),
    #[error("unknown config key `{0}`")]
    UnknownKey(String),
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub withdrawal_policy: WithdrawalPolicy,
    pub reminder_count: u32,
    /// Hour of day (UTC) used for payment reminders.
    pub reminder_hour: u32,
    pub quick_add_amounts: Vec<f64>,
    pub quick_withdraw_amounts: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "KD".into(),
            withdrawal_policy: WithdrawalPolicy::Strict,
            reminder_count: DEFAULT_REMINDER_COUNT,
            reminder_hour: 9,
            quick_add_amounts: vec![25.0, 50.0, 100.0, 200.0],
            quick_withdraw_amounts: vec![50.0, 100.0, 200.0, 500.0],
            data_dir: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 4] = [
        "currency",
        "withdrawal_policy",
        "reminder_count",
        "reminder_hour",
    ];

    /// Sets a scalar preference from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "currency" => {
                let code = value.trim();
                if code.is_empty() {
                    return Err(invalid("currency cannot be empty"));
                }
                self.currency = code.to_string();
            }
            "withdrawal_policy" => {
                self.withdrawal_policy = match value.trim().to_ascii_lowercase().as_str() {
                    "strict" => WithdrawalPolicy::Strict,
                    "clamp" => WithdrawalPolicy::Clamp,
                    _ => return Err(invalid("expected `strict` or `clamp`")),
                }
            }
            "reminder_count" => {
                let count: u32 = value.trim().parse().map_err(|_| invalid("expected a number"))?;
                if count == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.reminder_count = count;
            }
            "reminder_hour" => {
                let hour: u32 = value.trim().parse().map_err(|_| invalid("expected a number"))?;
                if hour > 23 {
                    return Err(invalid("must be between 0 and 23"));
                }
                self.reminder_hour = hour;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        Ok(match key {
            "currency" => self.currency.clone(),
            "withdrawal_policy" => match self.withdrawal_policy {
                WithdrawalPolicy::Strict => "strict".into(),
                WithdrawalPolicy::Clamp => "clamp".into(),
            },
            "reminder_count" => self.reminder_count.to_string(),
            "reminder_hour" => self.reminder_hour.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        })
    }
}

/// Resolves the application home: `$GOAL_SAVINGS_HOME`, then the platform
/// data directory, then `./.goal_savings`.
pub fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(resolve_home())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
            base,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding snapshot files, honoring `data_dir` when set.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| self.base.join(DATA_DIR))
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}
