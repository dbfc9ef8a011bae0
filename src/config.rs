//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Dialogue engine configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Business name used in the greeting and the closing message.
    pub business_name: String,
    /// Name the assistant introduces itself with.
    pub assistant_name: String,
    /// Idle sessions older than this are removed by the sweep.
    pub session_ttl: Duration,
    /// How often the host should run the sweep.
    pub sweep_interval: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            business_name: "Casa Demovélli".to_string(),
            assistant_name: "Clara".to_string(),
            session_ttl: Duration::from_secs(2 * 60 * 60), // 2 hours
            sweep_interval: Duration::from_secs(60 * 60),  // 1 hour
        }
    }
}

impl IntakeConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let session_ttl = env_secs("INTAKE_SESSION_TTL_SECS").unwrap_or(defaults.session_ttl);
        let sweep_interval =
            env_secs("INTAKE_SWEEP_INTERVAL_SECS").unwrap_or(defaults.sweep_interval);

        Self {
            business_name: std::env::var("INTAKE_BUSINESS_NAME")
                .unwrap_or(defaults.business_name),
            assistant_name: std::env::var("INTAKE_ASSISTANT_NAME")
                .unwrap_or(defaults.assistant_name),
            session_ttl,
            sweep_interval,
        }
    }
}

/// Process-level settings for the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub settings_path: PathBuf,
    pub http_port: u16,
    /// Read conversations from stdin.
    pub cli_enabled: bool,
    /// Phone number reported for the local CLI participant.
    pub local_phone: String,
    pub telegram_token: Option<SecretString>,
    /// Directory for daily-rolling log files. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
    pub intake: IntakeConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        let db_path = std::env::var("INTAKE_DB_PATH")
            .unwrap_or_else(|_| "./data/intake.db".to_string());
        let settings_path = std::env::var("INTAKE_SETTINGS_PATH")
            .unwrap_or_else(|_| "./data/settings.json".to_string());

        let http_port: u16 = std::env::var("INTAKE_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let cli_enabled = std::env::var("INTAKE_CLI")
            .map(|v| !matches!(v.trim(), "0" | "false" | "off"))
            .unwrap_or(true);

        let local_phone = std::env::var("INTAKE_LOCAL_PHONE").unwrap_or_default();

        let telegram_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let log_dir = std::env::var("INTAKE_LOG_DIR").ok().map(PathBuf::from);

        Self {
            db_path: PathBuf::from(db_path),
            settings_path: PathBuf::from(settings_path),
            http_port,
            cli_enabled,
            local_phone,
            telegram_token,
            log_dir,
            intake: IntakeConfig::from_env(),
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
