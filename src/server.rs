use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use tokio::sync::Semaphore;

use crate::catalog::CatalogStore;
use crate::config::AppConfig;
use crate::server_handlers::{
    availability_handler, available_files_handler, cached_courses_handler, courses_handler, generate_handler,
    health_handler, load_file_handler, root_handler, validate_handler,
};

/// Shared by every worker; cloned per request through `web::Data`.
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub config: Arc<AppConfig>,
    /// Bounds concurrent generations to the number of CPUs.
    pub generation_permits: Arc<Semaphore>,
    pub active_generations: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let procs = std::cmp::max(1, num_cpus::get());
        AppState {
            store: Arc::new(CatalogStore::new(config.data_dir.clone())),
            config: Arc::new(config),
            generation_permits: Arc::new(Semaphore::new(procs)),
            active_generations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Route table, shared by `run_server` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root_handler))
        .route("/health", web::get().to(health_handler))
        .route("/api/courses", web::get().to(courses_handler))
        .route("/api/courses/cached", web::get().to(cached_courses_handler))
        .route("/api/schedules/generate", web::post().to(generate_handler))
        .route("/api/schedules/validate", web::post().to(validate_handler))
        .route("/api/schedules/availability", web::post().to(availability_handler))
        .route("/api/schedules/available", web::get().to(available_files_handler))
        .route("/api/schedules/load/{filename}", web::get().to(load_file_handler));
}

/// `ALLOWED_ORIGINS=*` opens the API to any origin (without credentials).
fn cors(origins: &[String]) -> Cors {
    let base = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(3600);
    if origins.iter().any(|o| o == "*") {
        return base.allow_any_origin();
    }
    origins.iter().fold(base.supports_credentials(), |cors, origin| cors.allowed_origin(origin))
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let origins = config.allowed_origins.clone();
    let state = web::Data::new(AppState::new(config));

    tracing::info!(
        addr = %bind_addr,
        data_dir = %state.store.dir().display(),
        origins = ?origins,
        "starting schedule server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
