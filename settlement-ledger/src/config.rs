use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};

use core_types::SECONDS_PER_DAY;

/// Policy knobs for the settlement controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    #[serde(default = "default_label")]
    pub label: String,
    /// Minimum span between exercise opening and expiry.
    #[serde(default = "default_window_s")]
    pub min_exercise_window_s: i64,
    /// Minimum span between creation and expiry.
    #[serde(default = "default_window_s")]
    pub min_expiry_lead_s: i64,
}

fn default_label() -> String {
    "settlement".to_string()
}

fn default_window_s() -> i64 {
    SECONDS_PER_DAY
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            min_exercise_window_s: default_window_s(),
            min_expiry_lead_s: default_window_s(),
        }
    }
}

impl SettlementConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name("settlement.toml").required(false))
            .add_source(config::Environment::with_prefix("SETTLEMENT"))
            .build()?;
        settings.try_deserialize()
    }
}
