use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::PgPool;

use tasknest::auth::{AuthMiddleware, TokenService};
use tasknest::config::Config;
use tasknest::routes::{self, health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Signing keys are derived once here; handlers and the auth guard share
    // the service by reference.
    let tokens = web::Data::new(TokenService::new(&config.jwt_secret));
    let pool = web::Data::new(pool);

    log::info!("Starting tasknest server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.clone(), config.server_port))?
    .run()
    .await
}
