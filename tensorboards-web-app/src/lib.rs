//! Backend of the Tensorboards web app.

pub mod flavor;
pub mod routes;
pub mod tensorboard;

/// Name used when `APP_NAME` is not set.
pub const DEFAULT_APP_NAME: &str = "Tensorboards Web App";
