//! Backend of the Volumes web app: lists, creates, patches and deletes the
//! PersistentVolumeClaims of a namespace on behalf of the calling user.

pub mod flavor;
pub mod pvc;
pub mod routes;

/// Name used when `APP_NAME` is not set.
pub const DEFAULT_APP_NAME: &str = "Volumes Web App";
