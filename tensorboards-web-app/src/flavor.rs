use std::fmt;
use std::str::FromStr;

use crud_backend::startup::AppRoutes;
use crud_config::ConfigError;
use utoipa::OpenApi;

use crate::routes::{TensorboardsApiDoc, configure_default};

const DEFAULT_FLAVOR_NAME: &str = "default";

/// UI flavor of the Tensorboards web app, selected with `UI_FLAVOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorboardsFlavor {
    Default,
}

impl TensorboardsFlavor {
    pub const fn accepted_values() -> &'static [&'static str] {
        &[DEFAULT_FLAVOR_NAME]
    }

    pub fn routes(self) -> AppRoutes {
        match self {
            TensorboardsFlavor::Default => AppRoutes {
                configure: configure_default,
                openapi: TensorboardsApiDoc::openapi(),
            },
        }
    }
}

impl fmt::Display for TensorboardsFlavor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TensorboardsFlavor::Default => write!(f, "{DEFAULT_FLAVOR_NAME}"),
        }
    }
}

impl FromStr for TensorboardsFlavor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            DEFAULT_FLAVOR_NAME => Ok(Self::Default),
            other => Err(ConfigError::UnknownUiFlavor {
                flavor: other.to_string(),
                accepted: Self::accepted_values().join(", "),
            }),
        }
    }
}
