use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::path::Path;

mod actor;
mod api;
mod config;
mod core;
mod model;
mod routes;
mod state;
mod utils;
mod docs;

use config::Config;
use state::{AppState, Directory, load_seed};

use crate::utils::site_cache;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()

#[get("/")]
async fn index() -> impl Responder {
    "SiteCrew presence service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let directory = match config.seed_file.as_deref() {
        Some(path) => match load_seed(Path::new(path)) {
            Ok(seed) => {
                let directory = Directory::new(seed.workers, seed.sites);
                if directory.sites().is_empty() {
                    warn!("Seed has no sites, every check-in will be turned away");
                }
                info!(
                    workers = directory.worker_count(),
                    sites = directory.sites().len(),
                    "Seed loaded"
                );
                directory
            }
            Err(e) => {
                warn!(error = %e, "Seed file unreadable, starting with an empty directory");
                Directory::empty()
            }
        },
        None => {
            warn!("SEED_FILE not set, starting with an empty directory");
            Directory::empty()
        }
    };

    // One shared state handle; every worker thread clones the same stores.
    let state = Data::new(AppState::new(directory));

    let state_for_cache_warmup = state.clone();
    // 👇 clone what you need BEFORE moving config
    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    actix_web::rt::spawn(async move {
        site_cache::warmup_site_cache(&state_for_cache_warmup.directory).await;
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure presence routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
