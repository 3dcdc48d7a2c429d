mod backend_client;
mod classification;
mod config;
mod history;
mod imaging;
mod routes;
mod upload;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use backend_client::BackendClient;
use config::DashboardConfig;
use routes::configure_routes;
use upload::UploadPolicy;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = DashboardConfig::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let backend = BackendClient::new(&config.backend_host, config.request_timeout).map_err(|e| {
        log::error!("Failed to create backend client: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    let policy = UploadPolicy {
        max_bytes: config.max_upload_bytes,
    };

    log::info!("Classification backend: {}", config.backend_host);
    log::info!("Forward endpoint: {}", backend.forward_url());
    log::info!("History endpoint: {}", backend.history_url());
    if !config.frontend_dir.is_dir() {
        log::warn!(
            "Frontend bundle not found at {}; only the API will be served",
            config.frontend_dir.display()
        );
    }

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let frontend_dir = config.frontend_dir.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(backend.clone()))
            .app_data(web::Data::new(policy))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
