use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use officecomms::database::init_database;
use officecomms::middleware::{RequestIdMiddleware, cleanup_rate_limits};
use officecomms::services::{
    ExternalClients, MediaStorage,
    media::{LocalMediaStorage, MemoryMediaStorage},
};
use officecomms::{AppState, Config, Stores, routes};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("OfficeComms API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    println!("🚀 Starting OfficeComms API server...");

    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    let (stores, media_storage): (Stores, Arc<dyn MediaStorage>) = if config.uses_memory_store()
    {
        log::warn!("DATABASE_URL=memory: data will not survive a restart");
        (Stores::in_memory(), Arc::new(MemoryMediaStorage::default()))
    } else {
        let pool = init_database(&config.database_url).await?;
        println!("✅ Database initialized");
        (
            Stores::postgres(pool),
            Arc::new(LocalMediaStorage::new(&config.media_root)),
        )
    };

    let external = ExternalClients::from_config(&config);
    let server_address = config.server_address();
    let state = web::Data::new(AppState::new(config, stores, media_storage, external));

    tokio::spawn(cleanup_rate_limits(
        state.rate_limits.clone(),
        300,
        state.config.rate_limit_window_seconds,
    ));

    println!("🌐 Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(routes::json_config(&state))
            .wrap(
                Cors::default()
                    .allowed_origin(&state.config.cors_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
