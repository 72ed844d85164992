use std::fmt;
use std::str::FromStr;

use crud_backend::startup::AppRoutes;
use crud_config::ConfigError;
use utoipa::OpenApi;

use crate::routes::{RokApiDoc, VolumesApiDoc, configure_default, configure_rok};

const DEFAULT_FLAVOR_NAME: &str = "default";
const ROK_FLAVOR_NAME: &str = "rok";

/// UI flavor of the Volumes web app, selected with `UI_FLAVOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumesFlavor {
    Default,
    /// Adds the Rok storage classes listing.
    Rok,
}

impl VolumesFlavor {
    pub const fn accepted_values() -> &'static [&'static str] {
        &[DEFAULT_FLAVOR_NAME, ROK_FLAVOR_NAME]
    }

    /// Returns the routes and documentation served by this flavor.
    pub fn routes(self) -> AppRoutes {
        match self {
            VolumesFlavor::Default => AppRoutes {
                configure: configure_default,
                openapi: VolumesApiDoc::openapi(),
            },
            VolumesFlavor::Rok => {
                let mut openapi = VolumesApiDoc::openapi();
                openapi.merge(RokApiDoc::openapi());
                AppRoutes {
                    configure: configure_rok,
                    openapi,
                }
            }
        }
    }
}

impl fmt::Display for VolumesFlavor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VolumesFlavor::Default => write!(f, "{DEFAULT_FLAVOR_NAME}"),
            VolumesFlavor::Rok => write!(f, "{ROK_FLAVOR_NAME}"),
        }
    }
}

impl FromStr for VolumesFlavor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            DEFAULT_FLAVOR_NAME => Ok(Self::Default),
            ROK_FLAVOR_NAME => Ok(Self::Rok),
            other => Err(ConfigError::UnknownUiFlavor {
                flavor: other.to_string(),
                accepted: Self::accepted_values().join(", "),
            }),
        }
    }
}
