use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod agent;
mod ai;
mod config;
mod controllers;
mod db;
mod http;
mod models;
mod state;

use config::Config;
use db::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--reset") {
        log::warn!("Resetting database: dropping all tables and recreating them");
        db.reset().expect("Failed to reset database");
    }
    if args.iter().any(|a| a == "--seed-demo") {
        match db.seed_demo_data() {
            Ok(true) => log::info!("Demo data seeded"),
            Ok(false) => log::info!("Demo data already present, seed skipped"),
            Err(e) => log::error!("Failed to seed demo data: {}", e),
        }
    }

    log::info!(
        "AI endpoint: {} (model: {})",
        config.ai_endpoint,
        config.ai_model.as_deref().unwrap_or("(endpoint default)")
    );
    log::info!("Starting shop assistant server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::nodes::config)
            .configure(controllers::assist::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
