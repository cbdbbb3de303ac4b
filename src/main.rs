use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::json;
use sqlx::PgPool;

use taskwarden::auth::{SessionAuthority, TokenKeys};
use taskwarden::config::Config;
use taskwarden::error::AppError;
use taskwarden::routes;
use taskwarden::store::{PgRevocationStore, PgUserStore};

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Not found" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // The deny-list may live in a separate store; by default it shares the pool.
    let revocation_pool = match &config.revocation_database_url {
        Some(url) if url != &config.database_url => PgPool::connect(url)
            .await
            .expect("Failed to connect to revocation store"),
        _ => pool.clone(),
    };

    let keys = TokenKeys::new(&config.access_secret, &config.refresh_secret);
    let authority = web::Data::new(SessionAuthority::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgRevocationStore::new(revocation_pool)),
        keys.clone(),
        config.bcrypt_cost,
    ));
    let keys = web::Data::new(keys);

    log::info!("Starting TaskWarden server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(authority.clone())
            .app_data(keys.clone())
            .app_data(web::JsonConfig::default().error_handler(|_err, _req| {
                AppError::BadRequest("Malformed request".into()).into()
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config))
            .default_service(web::route().to(not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
