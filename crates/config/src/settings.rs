use crate::{
    error::ConfigError,
    mode::{ConnectionPolicy, OperationMode, Scope},
};
use serde::Deserialize;
use std::{collections::HashMap, fmt, path::Path};
use tracing::debug;

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_NAMESPACE: &str = "models";

/// Connection and mapping settings.
///
/// `mode` and `connection` are kept as text and checked by [`Settings::validate`]
/// so that an unknown mode surfaces as `UnknownOperationMode` rather than a
/// parse failure.
#[derive(Clone, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database used in single mode.
    #[serde(default)]
    pub database: Option<String>,
    /// Namespace prefixed to entity class names.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Prepended to the lower-cased scope name in multi mode.
    #[serde(default)]
    pub database_prefix: String,
    #[serde(default)]
    pub connection: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: None,
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            database: None,
            namespace: default_namespace(),
            database_prefix: String::new(),
            connection: None,
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("mode", &self.mode)
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("namespace", &self.namespace)
            .field("database_prefix", &self.database_prefix)
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Reads `DB_MODE`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`,
    /// `DB_NAME`, `DB_NAMESPACE`, `DB_PREFIX` and `DB_CONNECTION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let mut vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with("DB_"))
            .collect();
        let mut take = |key: &str| vars.remove(key).filter(|v| !v.is_empty());

        let port = match take("DB_PORT") {
            Some(port) => port.trim().parse::<u16>().map_err(|e| {
                ConfigError::ConfigurationInvalid(format!("DB_PORT `{port}`: {e}"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Settings {
            mode: take("DB_MODE"),
            user: take("DB_USER").unwrap_or_default(),
            password: take("DB_PASSWORD").unwrap_or_default(),
            host: take("DB_HOST").unwrap_or_default(),
            port,
            database: take("DB_NAME"),
            namespace: take("DB_NAMESPACE").unwrap_or_else(default_namespace),
            database_prefix: take("DB_PREFIX").unwrap_or_default(),
            connection: take("DB_CONNECTION"),
        })
    }

    pub fn operation_mode(&self) -> Result<OperationMode, ConfigError> {
        match self.mode.as_deref().map(str::trim) {
            None | Some("") => Err(ConfigError::MissingMode),
            Some(mode) => mode.parse(),
        }
    }

    pub fn connection_policy(&self) -> Result<ConnectionPolicy, ConfigError> {
        match self.connection.as_deref().map(str::trim) {
            None | Some("") => Ok(ConnectionPolicy::default()),
            Some(policy) => policy.parse(),
        }
    }

    /// Checks the settings needed to open connections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mode = self.operation_mode()?;
        self.connection_policy()?;

        let missing: Vec<&str> = [
            ("user", &self.user),
            ("password", &self.password),
            ("host", &self.host),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ConfigError::ConfigurationInvalid(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        if mode == OperationMode::Single && self.single_database().is_none() {
            return Err(ConfigError::ConfigurationInvalid(
                "single mode requires a database".to_string(),
            ));
        }
        Ok(())
    }

    /// Database name for `scope`: the configured database in single mode,
    /// `database_prefix` plus the lower-cased scope name in multi mode.
    pub fn database_for(&self, scope: &Scope) -> Result<String, ConfigError> {
        match self.operation_mode()? {
            OperationMode::Single => self.single_database().map(str::to_string).ok_or_else(|| {
                ConfigError::ConfigurationInvalid("single mode requires a database".to_string())
            }),
            OperationMode::Multi => {
                let name = scope.name().trim();
                if name.is_empty() {
                    return Err(ConfigError::ConfigurationInvalid(
                        "client scope without a name".to_string(),
                    ));
                }
                Ok(format!("{}{}", self.database_prefix, name.to_lowercase()))
            }
        }
    }

    pub fn target(&self, database: &str) -> ConnectTarget {
        ConnectTarget {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: database.to_string(),
        }
    }

    fn single_database(&self) -> Option<&str> {
        self.database.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Everything needed to open one connection.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const SINGLE: &str = r#"
        mode = "single"
        user = "app"
        password = "secret"
        host = "db.local"
        database = "shop"
    "#;

    #[test]
    fn test_toml_defaults() {
        let settings = Settings::from_toml_str(SINGLE).unwrap();
        assert_eq!(settings.port, 3306);
        assert_eq!(settings.namespace, "models");
        assert_eq!(settings.connection_policy().unwrap(), ConnectionPolicy::Shared);
        settings.validate().unwrap();
    }

    #[test]
    fn test_single_mode_database() {
        let settings = Settings::from_toml_str(SINGLE).unwrap();
        assert_eq!(settings.database_for(&Scope::Core).unwrap(), "shop");
        assert_eq!(
            settings
                .database_for(&Scope::Client("Acme".into()))
                .unwrap(),
            "shop"
        );
    }

    #[test]
    fn test_multi_mode_database() {
        let settings = Settings::from_toml_str(
            r#"
            mode = "multi"
            user = "app"
            password = "secret"
            host = "db.local"
            database_prefix = "erp_"
            connection = "independent"
            "#,
        )
        .unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.database_for(&Scope::Core).unwrap(), "erp_core");
        assert_eq!(
            settings
                .database_for(&Scope::Client("Acme".into()))
                .unwrap(),
            "erp_acme"
        );
        assert_eq!(
            settings.connection_policy().unwrap(),
            ConnectionPolicy::Independent
        );
    }

    #[test]
    fn test_missing_and_unknown_mode() {
        let mut settings = Settings::from_toml_str(SINGLE).unwrap();
        settings.mode = None;
        assert!(matches!(settings.validate(), Err(ConfigError::MissingMode)));

        settings.mode = Some("sharded".into());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::UnknownOperationMode(m)) if m == "sharded"
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let mut settings = Settings::from_toml_str(SINGLE).unwrap();
        settings.user.clear();
        settings.host = "  ".into();
        match settings.validate() {
            Err(ConfigError::ConfigurationInvalid(detail)) => {
                assert_eq!(detail, "missing user, host")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_single_mode_requires_database() {
        let mut settings = Settings::from_toml_str(SINGLE).unwrap();
        settings.database = Some(String::new());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ConfigurationInvalid(_))
        ));
    }

    #[test]
    fn test_from_vars() {
        let settings = Settings::from_vars(vars(&[
            ("DB_MODE", "multi"),
            ("DB_USER", "u"),
            ("DB_PASSWORD", "p"),
            ("DB_HOST", "h"),
            ("DB_PORT", "3307"),
            ("DB_PREFIX", "t_"),
            ("DB_NAMESPACE", "app"),
            ("HOME", "/root"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 3307);
        assert_eq!(settings.namespace, "app");
        assert_eq!(settings.database_for(&Scope::Core).unwrap(), "t_core");
    }

    #[test]
    fn test_from_vars_rejects_bad_port() {
        let result = Settings::from_vars(vars(&[("DB_PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::ConfigurationInvalid(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Settings::from_toml_str("mode = "),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = Settings::from_toml_str(SINGLE).unwrap();
        let target = settings.target("shop");
        assert!(!format!("{settings:?}").contains("secret"));
        assert!(!format!("{target:?}").contains("secret"));
        assert_eq!((target.database.as_str(), target.port), ("shop", 3306));
    }
}
