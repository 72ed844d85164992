//! Resolution of the caller's identity from the request headers.
//!
//! The web apps run behind an authenticating proxy which forwards the user id
//! in a configurable header, optionally prefixed (e.g. `accounts.google.com:`).

use std::fmt;
use std::future::{Ready, ready};

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    web::Data,
};
use crud_config::Settings;
use thiserror::Error;
use tracing::{error, info};

use crate::routes::error_envelope;

/// Name of the authenticated user, with the configured prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Identity {
        Identity(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user on whose behalf a request is served.
///
/// Has no identity when the header is absent, which is only accepted while
/// authorization is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    identity: Option<Identity>,
}

impl Caller {
    pub fn anonymous() -> Caller {
        Caller { identity: None }
    }

    pub fn user(name: impl Into<String>) -> Caller {
        Caller {
            identity: Some(Identity::new(name)),
        }
    }

    /// Builds a caller from the raw header value. `prefix` is stripped from
    /// the front of the value when present; an empty result means no identity.
    pub fn from_header(value: Option<&str>, prefix: &str) -> Caller {
        let identity = value
            .map(|value| value.strip_prefix(prefix).unwrap_or(value))
            .filter(|name| !name.is_empty())
            .map(Identity::new);

        Caller { identity }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("No user detected.")]
    NoUser,

    #[error("the application settings are not available")]
    MissingSettings,
}

impl ResponseError for AuthnError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthnError::NoUser => StatusCode::UNAUTHORIZED,
            AuthnError::MissingSettings => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_envelope(self.status_code(), self.to_string())
    }
}

impl FromRequest for Caller {
    type Error = AuthnError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_caller(req))
    }
}

fn extract_caller(req: &HttpRequest) -> Result<Caller, AuthnError> {
    let Some(settings) = req.app_data::<Data<Settings>>() else {
        error!("settings are missing from the application data");
        return Err(AuthnError::MissingSettings);
    };

    let value = req
        .headers()
        .get(settings.userid_header.as_str())
        .and_then(|value| value.to_str().ok());
    let caller = Caller::from_header(value, &settings.userid_prefix);

    if caller.identity.is_none() && !settings.disable_auth {
        info!(header = %settings.userid_header, "no user found in the request");
        return Err(AuthnError::NoUser);
    }

    Ok(caller)
}
