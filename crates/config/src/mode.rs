use crate::error::ConfigError;
use std::{fmt, str::FromStr};

/// How databases are chosen: one fixed database, or one database per scope
/// (the shared core plus one per client).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Single,
    Multi,
}

impl FromStr for OperationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(OperationMode::Single),
            "multi" => Ok(OperationMode::Multi),
            _ => Err(ConfigError::UnknownOperationMode(s.to_string())),
        }
    }
}

/// Whether repositories share one connection per database for the lifetime
/// of the factory, or each opens its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPolicy {
    #[default]
    Shared,
    Independent,
}

impl FromStr for ConnectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(ConnectionPolicy::Shared),
            "independent" => Ok(ConnectionPolicy::Independent),
            _ => Err(ConfigError::ConfigurationInvalid(format!(
                "unknown connection policy `{s}`"
            ))),
        }
    }
}

/// Database scope in multi mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Core,
    Client(String),
}

impl Scope {
    pub const CORE: &'static str = "core";

    pub fn name(&self) -> &str {
        match self {
            Scope::Core => Self::CORE,
            Scope::Client(name) => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("single".parse::<OperationMode>().unwrap(), OperationMode::Single);
        assert_eq!(" Multi ".parse::<OperationMode>().unwrap(), OperationMode::Multi);
        assert!(matches!(
            "cluster".parse::<OperationMode>(),
            Err(ConfigError::UnknownOperationMode(m)) if m == "cluster"
        ));
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!(
            "independent".parse::<ConnectionPolicy>().unwrap(),
            ConnectionPolicy::Independent
        );
        assert!(matches!(
            "pooled".parse::<ConnectionPolicy>(),
            Err(ConfigError::ConfigurationInvalid(_))
        ));
    }
}
