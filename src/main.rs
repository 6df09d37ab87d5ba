use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use log::{error, info};

use config::Config;
use model::{AppState, SqliteStore};
use upload::ImageStore;

mod auth;
mod config;
mod logger;
mod model;
mod routes;
mod upload;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = logger::init() {
        eprintln!("Failed to initialize logger: {}", err);
        return ExitCode::FAILURE;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let store = match SqliteStore::open(&config.database_path) {
        Ok(store) => store,
        Err(err) => {
            error!("Database can't connect: {}", err);
            return ExitCode::FAILURE;
        }
    };
    info!("Database connected ({})", config.database_path);

    let images = ImageStore::new(config.images_dir.clone(), &config.public_url);
    if let Err(err) = images.create_dir().await {
        error!(
            "Failed to create image directory {}: {}",
            config.images_dir.display(),
            err
        );
        return ExitCode::FAILURE;
    }

    let state = Arc::new(AppState::new(
        Box::new(store),
        images,
        config.auth_secret.clone(),
        config.upload_limit,
    ));
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting kinship server at {}", addr);

    let server = match axum::Server::try_bind(&addr) {
        Ok(server) => server,
        Err(err) => {
            error!("Failed to bind {}: {}", addr, err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = server.serve(app.into_make_service()).await {
        error!("Server error: {}", err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
