use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub refund_policy: RefundPolicyConfig,
    #[serde(default)]
    pub earnings: EarningsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

/// Refund policy. Deserialized once at startup and passed into the
/// executor and the sweep worker as an immutable value; changing any
/// of these requires a restart.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundPolicyConfig {
    /// How long a doctor has to respond after a purchase before the
    /// purchase becomes refund-eligible.
    #[serde(default = "default_response_timeout_minutes")]
    pub response_timeout_minutes: i64,

    /// Refund percentage by reason. Unknown reasons fall back to the
    /// "default" entry.
    #[serde(default = "default_refund_percentages")]
    pub percentages: HashMap<String, u32>,

    /// Master switch for sweep-initiated refunds. Manual refunds stay
    /// available when this is off.
    #[serde(default = "default_true")]
    pub auto_refund_enabled: bool,

    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    #[serde(default = "default_true")]
    pub sweep_enabled: bool,

    #[serde(default = "default_true")]
    pub notify_patients: bool,

    #[serde(default = "default_true")]
    pub notify_doctors: bool,

    #[serde(default)]
    pub email_enabled: bool,

    #[serde(default)]
    pub warning_thresholds: WarningThresholds,
}

impl Default for RefundPolicyConfig {
    fn default() -> Self {
        Self {
            response_timeout_minutes: default_response_timeout_minutes(),
            percentages: default_refund_percentages(),
            auto_refund_enabled: true,
            sweep_interval_ms: default_sweep_interval_ms(),
            sweep_enabled: true,
            notify_patients: true,
            notify_doctors: true,
            email_enabled: false,
            warning_thresholds: WarningThresholds::default(),
        }
    }
}

impl RefundPolicyConfig {
    /// Resolve the refund percentage for a reason, falling back to the
    /// "default" entry (50 if the table has no such entry).
    pub fn refund_percentage(&self, reason: &str) -> u32 {
        self.percentages
            .get(reason)
            .or_else(|| self.percentages.get("default"))
            .copied()
            .unwrap_or(50)
    }

    pub fn response_timeout(&self) -> time::Duration {
        time::Duration::minutes(self.response_timeout_minutes)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Trailing-window refund counts at or above these values select the
/// warning tier sent to a doctor (mild < moderate < severe).
#[derive(Debug, Clone, Deserialize)]
pub struct WarningThresholds {
    pub mild: u64,
    pub moderate: u64,
    pub severe: u64,
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            mild: 3,
            moderate: 5,
            severe: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EarningsConfig {
    /// Doctor share of a purchase amount, snapshotted into each
    /// earning at creation time.
    #[serde(default = "default_commission_percentage")]
    pub commission_percentage: i32,
}

impl Default for EarningsConfig {
    fn default() -> Self {
        Self {
            commission_percentage: default_commission_percentage(),
        }
    }
}

fn default_response_timeout_minutes() -> i64 {
    30
}

fn default_sweep_interval_ms() -> u64 {
    600_000
}

fn default_commission_percentage() -> i32 {
    70
}

fn default_true() -> bool {
    true
}

fn default_refund_percentages() -> HashMap<String, u32> {
    HashMap::from([
        ("doctor-no-response".to_string(), 100),
        ("manual-admin".to_string(), 100),
        ("patient-request".to_string(), 80),
        ("technical-issue".to_string(), 100),
        ("default".to_string(), 50),
    ])
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        // Build config from config.yml (required) with environment variable overrides
        let config = config::Config::builder()
            // Load config.yml (REQUIRED)
            .add_source(config::File::with_name("config").required(true))
            // Allow environment variables to override config file
            .add_source(
                config::Environment::with_prefix("MEDIPAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_table_matches_documented_defaults() {
        let policy = RefundPolicyConfig::default();

        assert_eq!(policy.refund_percentage("doctor-no-response"), 100);
        assert_eq!(policy.refund_percentage("manual-admin"), 100);
        assert_eq!(policy.refund_percentage("patient-request"), 80);
        assert_eq!(policy.refund_percentage("technical-issue"), 100);
    }

    #[test]
    fn unknown_reason_falls_back_to_default_entry() {
        let policy = RefundPolicyConfig::default();

        assert_eq!(policy.refund_percentage("some-future-reason"), 50);
    }

    #[test]
    fn missing_default_entry_falls_back_to_fifty() {
        let policy = RefundPolicyConfig {
            percentages: HashMap::from([("doctor-no-response".to_string(), 100)]),
            ..RefundPolicyConfig::default()
        };

        assert_eq!(policy.refund_percentage("anything-else"), 50);
    }
}
