//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use junkick_service::config::Config;
use junkick_service::routes;
use junkick_service::state::AppState;
use junkick_service::storage::Store;
use junkick_service::utils::{security_headers, Authentication, RateLimit};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let store = Store::open(&config.storage_path).map_err(|e| {
        error!("❌ Could not open storage at {}: {}", config.storage_path, e);
        e
    })?;

    let address = config.address();
    let state = web::Data::new(AppState::new(store, config));

    info!("🚀 Server starting at http://{}{}", address, state.config.api_prefix);

    // One limiter for every worker
    let rate_limit = RateLimit::new(
        state.config.rate_limit_window(),
        state.config.rate_limit_max_requests,
    );
    info!(
        "🚦 Rate limit: {} requests per {:?} per client",
        state.config.rate_limit_max_requests,
        state.config.rate_limit_window()
    );

    let server_state = state.clone();
    HttpServer::new(move || {
        let config = &server_state.config;
        let cors = Cors::default()
            .allowed_origin(&config.cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        let prefix = config.api_prefix.clone();
        App::new()
            .app_data(server_state.clone())
            .wrap(Authentication::new(config.jwt.clone()))
            .wrap(rate_limit.clone())
            .wrap(cors)
            .wrap(security_headers())
            .wrap(middleware::Logger::default())
            .configure(|cfg| routes::init_routes(cfg, &prefix))
    })
    .bind(&address)?
    .run()
    .await?;

    info!("👋 Server stopped");
    Ok(())
}
