use std::path::PathBuf;

use clap::Parser;
use crud_config::BackendMode;
use crud_telemetry::init_tracing;
use update_manifests_images::{APPLICATIONS, update_manifests_images};

/// Update image tags in manifests.
///
/// Every kustomization is parsed and written back in full, so comments and
/// the original quoting of the edited files are not preserved. Review the
/// diff before committing.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Image tag to use.
    tag: String,

    /// Root of the repository the kustomization paths are relative to.
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"), BackendMode::Development)?;

    update_manifests_images(&args.root, &args.tag, APPLICATIONS)?;

    Ok(())
}
