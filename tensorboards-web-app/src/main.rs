use crud_backend::startup::Application;
use crud_config::load_settings;
use crud_telemetry::init_tracing;
use tensorboards_web_app::{DEFAULT_APP_NAME, flavor::TensorboardsFlavor};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = load_settings(DEFAULT_APP_NAME)?;
    let flavor: TensorboardsFlavor = settings.ui_flavor.parse()?;

    let _log_flusher = init_tracing(&settings.app_name, settings.backend_mode)?;
    info!(%flavor, "selected ui flavor");

    // We start the runtime.
    actix_web::rt::System::new().block_on(async move {
        let application = Application::build(settings, flavor.routes()).await?;
        application.run_until_stopped().await?;

        Ok::<_, anyhow::Error>(())
    })?;

    Ok(())
}
