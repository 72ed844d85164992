use std::{net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::Server, middleware::Condition, web};
use crud_config::Settings;
use crud_telemetry::metrics::init_metrics_handle;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;

use crate::{
    k8s::{K8sClient, http::HttpK8sClient},
    metrics::register_metrics,
    ops::ResourceOps,
    routes::{
        ApiError, CommonApiDoc, not_found,
        api_docs::openapi_json,
        health_check::{liveness, readiness},
        metrics::metrics,
        namespaces::read_all_namespaces,
        storage_classes::{read_all_storage_classes, read_default_storage_class},
    },
};

/// The routes a web app adds on top of the shared ones, with their
/// documentation.
#[derive(Clone)]
pub struct AppRoutes {
    pub configure: fn(&mut web::ServiceConfig),
    pub openapi: utoipa::openapi::OpenApi,
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Binds the listener and connects to the cluster. A missing cluster
    /// configuration is fatal.
    pub async fn build(settings: Settings, routes: AppRoutes) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", settings.application.host, settings.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let k8s_client = Arc::new(HttpK8sClient::new().await?) as Arc<dyn K8sClient>;

        let server = run(settings, listener, k8s_client, routes).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn scope_path(prefix: &str) -> String {
    if prefix == "/" {
        String::new()
    } else {
        prefix.to_string()
    }
}

pub async fn run(
    settings: Settings,
    listener: TcpListener,
    k8s_client: Arc<dyn K8sClient>,
    routes: AppRoutes,
) -> Result<Server, anyhow::Error> {
    register_metrics();
    let metrics_handle = init_metrics_handle()?;

    let mut openapi = CommonApiDoc::openapi();
    openapi.merge(routes.openapi);
    let openapi = web::Data::new(openapi);

    let ops = web::Data::new(ResourceOps::new(k8s_client, settings.disable_auth));
    let dev_mode = !settings.backend_mode.is_prod();
    let scope = scope_path(&settings.prefix);
    let configure = routes.configure;

    info!(
        app = %settings.app_name,
        mode = %settings.backend_mode,
        prefix = %settings.prefix,
        disable_auth = settings.disable_auth,
        address = %listener.local_addr()?,
        "starting web app"
    );
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());
        let query_config = web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

        App::new()
            // Development frontends are served from another origin.
            .wrap(Condition::new(dev_mode, Cors::permissive()))
            .wrap(TracingLogger::default())
            .app_data(json_config)
            .app_data(query_config)
            .app_data(settings.clone())
            .app_data(ops.clone())
            .app_data(openapi.clone())
            .app_data(web::ThinData(metrics_handle.clone()))
            .service(
                web::scope(&scope)
                    .service(liveness)
                    .service(readiness)
                    .service(metrics)
                    .service(openapi_json)
                    .service(read_all_namespaces)
                    .service(read_all_storage_classes)
                    .service(read_default_storage_class)
                    .configure(configure),
            )
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
