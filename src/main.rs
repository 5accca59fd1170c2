#![allow(async_fn_in_trait)]

mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod messages;
mod middlewares;
mod request;
mod response;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use config::Config;
use database::sqlx::PgSqlxManager;
use impls::tokener::jwt::JWT;
use log::info;
use middlewares::session::Session;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::load()?;
    let manager = PgSqlxManager::connect(&config).await?;
    let secret = config.jwt_secret.as_bytes().to_owned();
    let addr = (config.bind_addr.clone(), config.port);
    info!("listening on {}:{}", addr.0, addr.1);
    HttpServer::new(move || {
        App::new()
            .wrap(Session::new(secret.clone()))
            .wrap(Logger::default())
            .app_data(Data::new(manager.clone()))
            .app_data(Data::new(JWT::new(secret.clone())))
            .app_data(Data::new(config.clone()))
            .configure(handlers::routes::<PgSqlxManager>)
    })
    .bind(addr)?
    .run()
    .await?;
    Ok(())
}
