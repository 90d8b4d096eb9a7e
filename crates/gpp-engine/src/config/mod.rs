mod rules;

pub use rules::{
    CategoryRule, CategorySection, CompiledRules, LectureColumns, NumberLike, Params, RuleBook,
    SecondaryPoolRule, SecondarySection, StudentColumns,
};

use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level process configuration, read from the environment and `.env`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub paths: DataPaths,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let rules = env::var("GPP_RULES_PATH").unwrap_or_else(|_| "rules.toml".to_string());
        let data_dir = env::var("GPP_DATA_DIR").unwrap_or_else(|_| ".".to_string());
        let log_dir = env::var("GPP_LOG_DIR").unwrap_or_else(|_| "log".to_string());
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            environment,
            paths: DataPaths {
                rules: PathBuf::from(rules),
                data_dir: PathBuf::from(data_dir),
                log_dir: PathBuf::from(log_dir),
            },
            telemetry: TelemetryConfig { log_level },
        }
    }
}

/// Locations of the rule book, the input tables and the audit log directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub rules: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl DataPaths {
    pub fn lectures_csv(&self) -> PathBuf {
        self.data_dir.join("lectures.csv")
    }

    pub fn students_csv(&self) -> PathBuf {
        self.data_dir.join("students.csv")
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Fatal configuration problems; all are raised before any student is processed.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml(toml::de::Error),
    InvalidPattern {
        rule: String,
        source: regex::Error,
    },
    InvalidCap {
        rule: String,
        value: String,
    },
    InvalidCapacity {
        pool: String,
        value: String,
    },
    InvalidTarget(String),
    DuplicateRule(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, .. } => {
                write!(f, "unable to read rule book {}", path.display())
            }
            ConfigError::Toml(err) => write!(f, "rule book is not valid TOML: {}", err),
            ConfigError::InvalidPattern { rule, .. } => {
                write!(f, "rule '{}' contains an invalid category pattern", rule)
            }
            ConfigError::InvalidCap { rule, value } => write!(
                f,
                "category '{}' max_credits must be a non-negative number, got '{}'",
                rule, value
            ),
            ConfigError::InvalidCapacity { pool, value } => write!(
                f,
                "secondary pool '{}' capacity must be a non-negative number, got '{}'",
                pool, value
            ),
            ConfigError::InvalidTarget(value) => write!(
                f,
                "extrapolate_target_credits must be an integer or float, got {}",
                value
            ),
            ConfigError::DuplicateRule(name) => {
                write!(f, "rule name '{}' is declared more than once", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml(err) => Some(err),
            ConfigError::InvalidPattern { source, .. } => Some(source),
            ConfigError::InvalidCap { .. }
            | ConfigError::InvalidCapacity { .. }
            | ConfigError::InvalidTarget(_)
            | ConfigError::DuplicateRule(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("GPP_RULES_PATH");
        env::remove_var("GPP_DATA_DIR");
        env::remove_var("GPP_LOG_DIR");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load();
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.paths.rules, PathBuf::from("rules.toml"));
        assert_eq!(config.paths.lectures_csv(), PathBuf::from("./lectures.csv"));
        assert_eq!(config.paths.log_dir, PathBuf::from("log"));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn data_dir_override_moves_input_tables() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GPP_DATA_DIR", "/srv/registrar");
        env::set_var("APP_ENV", "prod");
        let config = AppConfig::load();
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(
            config.paths.students_csv(),
            PathBuf::from("/srv/registrar/students.csv")
        );
        reset_env();
    }
}
