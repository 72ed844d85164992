use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Short development mode identifier.
const DEV_MODE_NAME: &str = "dev";

/// Long development mode identifier.
const DEVELOPMENT_MODE_NAME: &str = "development";

/// Short production mode identifier.
const PROD_MODE_NAME: &str = "prod";

/// Long production mode identifier.
const PRODUCTION_MODE_NAME: &str = "production";

/// Runtime mode of a backend, selected with `BACKEND_MODE`.
///
/// Development mode enables permissive CORS headers and human readable logs,
/// production mode emits JSON logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Local development against a cluster, usually through `kubectl proxy`.
    Development,
    /// In-cluster deployment.
    Production,
}

impl BackendMode {
    /// Returns all accepted `BACKEND_MODE` values.
    pub const fn accepted_values() -> &'static [&'static str] {
        &[
            DEV_MODE_NAME,
            DEVELOPMENT_MODE_NAME,
            PROD_MODE_NAME,
            PRODUCTION_MODE_NAME,
        ]
    }

    /// Returns whether this is the production mode.
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendMode::Development => write!(f, "{DEV_MODE_NAME}"),
            BackendMode::Production => write!(f, "{PROD_MODE_NAME}"),
        }
    }
}

impl FromStr for BackendMode {
    type Err = ConfigError;

    /// Parses a [`BackendMode`], case-insensitively.
    ///
    /// Both the short (`dev`, `prod`) and the long (`development`, `production`)
    /// spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            DEV_MODE_NAME | DEVELOPMENT_MODE_NAME => Ok(Self::Development),
            PROD_MODE_NAME | PRODUCTION_MODE_NAME => Ok(Self::Production),
            other => Err(ConfigError::UnknownBackendMode {
                mode: other.to_string(),
                accepted: Self::accepted_values().join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_spellings_are_accepted() {
        assert_eq!("dev".parse::<BackendMode>().unwrap(), BackendMode::Development);
        assert_eq!(
            "development".parse::<BackendMode>().unwrap(),
            BackendMode::Development
        );
        assert_eq!("prod".parse::<BackendMode>().unwrap(), BackendMode::Production);
        assert_eq!(
            "Production".parse::<BackendMode>().unwrap(),
            BackendMode::Production
        );
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = "staging".parse::<BackendMode>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackendMode { .. }));
        assert!(err.to_string().contains("staging"));
    }
}
