use serde::Deserialize;
use std::fmt;

use crate::{BackendMode, ConfigError};

/// Default header carrying the authenticated user id.
pub const DEFAULT_USERID_HEADER: &str = "kubeflow-userid";

/// Default prefix stripped from the user id header value.
pub const DEFAULT_USERID_PREFIX: &str = ":";

/// Default UI flavor name.
pub const DEFAULT_UI_FLAVOR: &str = "default";

/// Default URL prefix the backend is mounted under.
pub const DEFAULT_PREFIX: &str = "/";

/// Default host address the server listens on.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port the server listens on.
const DEFAULT_PORT: i64 = 5000;

/// Mapping of environment variable names to configuration keys.
///
/// Nested keys use `.` as separator, e.g. `APP_PORT` sets `application.port`.
const ENV_KEYS: &[(&str, &str)] = &[
    ("APP_NAME", "app_name"),
    ("BACKEND_MODE", "backend_mode"),
    ("UI_FLAVOR", "ui_flavor"),
    ("APP_PREFIX", "prefix"),
    ("APP_DISABLE_AUTH", "disable_auth"),
    ("USERID_HEADER", "userid_header"),
    ("USERID_PREFIX", "userid_prefix"),
    ("APP_HOST", "application.host"),
    ("APP_PORT", "application.port"),
];

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host address the backend listens on.
    pub host: String,
    /// Port number the backend listens on.
    pub port: u16,
}

impl fmt::Display for ApplicationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    host: {}", self.host)?;
        writeln!(f, "    port: {}", self.port)
    }
}

/// Settings as they come out of the configuration sources, before validation.
#[derive(Debug, Deserialize)]
struct RawSettings {
    app_name: String,
    backend_mode: String,
    ui_flavor: String,
    prefix: String,
    disable_auth: bool,
    userid_header: String,
    userid_prefix: String,
    application: ApplicationSettings,
}

/// Immutable process-wide configuration of a web-app backend.
///
/// Built once at startup by [`load_settings`] and shared with every component
/// that needs it. Nothing reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Human readable application name, used in logs.
    pub app_name: String,
    /// Development or production mode.
    pub backend_mode: BackendMode,
    /// Name of the UI flavor, resolved by each application into its own variants.
    pub ui_flavor: String,
    /// URL prefix all routes are mounted under, always starting with `/` and
    /// never ending with one unless it is the root.
    pub prefix: String,
    /// When set, every authorization check is skipped.
    pub disable_auth: bool,
    /// Request header carrying the user id.
    pub userid_header: String,
    /// Prefix stripped from the user id header value.
    pub userid_prefix: String,
    /// Listener settings.
    pub application: ApplicationSettings,
}

impl Settings {
    /// Returns the settings used by local tests: auth disabled, development mode.
    pub fn for_tests(app_name: &str) -> Settings {
        Settings {
            app_name: app_name.to_string(),
            backend_mode: BackendMode::Development,
            ui_flavor: DEFAULT_UI_FLAVOR.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            disable_auth: true,
            userid_header: DEFAULT_USERID_HEADER.to_string(),
            userid_prefix: DEFAULT_USERID_PREFIX.to_string(),
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
        }
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let header = raw.userid_header.trim();
        if header.is_empty() {
            return Err(ConfigError::EmptyUseridHeader);
        }

        Ok(Settings {
            app_name: raw.app_name,
            backend_mode: raw.backend_mode.parse()?,
            ui_flavor: raw.ui_flavor.trim().to_lowercase(),
            prefix: normalize_prefix(&raw.prefix),
            disable_auth: raw.disable_auth,
            userid_header: header.to_string(),
            userid_prefix: raw.userid_prefix,
            application: raw.application,
        })
    }
}

/// Loads [`Settings`] from the process environment.
///
/// `default_app_name` is used when `APP_NAME` is unset. See [`load_settings_from`]
/// for the list of variables.
pub fn load_settings(default_app_name: &str) -> Result<Settings, ConfigError> {
    load_settings_from(default_app_name, |key| std::env::var(key).ok())
}

/// Loads [`Settings`] using `lookup` to resolve environment variables.
///
/// Recognized variables are `APP_NAME`, `BACKEND_MODE`, `UI_FLAVOR`,
/// `APP_PREFIX`, `APP_DISABLE_AUTH`, `USERID_HEADER`, `USERID_PREFIX`,
/// `APP_HOST` and `APP_PORT`. Boolean values are parsed case-insensitively.
pub fn load_settings_from<F>(default_app_name: &str, lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = config::Config::builder()
        .set_default("app_name", default_app_name)?
        .set_default("backend_mode", BackendMode::Production.to_string())?
        .set_default("ui_flavor", DEFAULT_UI_FLAVOR)?
        .set_default("prefix", DEFAULT_PREFIX)?
        .set_default("disable_auth", false)?
        .set_default("userid_header", DEFAULT_USERID_HEADER)?
        .set_default("userid_prefix", DEFAULT_USERID_PREFIX)?
        .set_default("application.host", DEFAULT_HOST)?
        .set_default("application.port", DEFAULT_PORT)?;

    for (env_name, key) in ENV_KEYS {
        builder = builder.set_override_option(*key, lookup(env_name))?;
    }

    let raw = builder.build()?.try_deserialize::<RawSettings>()?;

    raw.try_into()
}

/// Normalizes a URL prefix to `/segment[/segment…]` form.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_PREFIX.to_string();
    }

    format!("/{trimmed}")
}
