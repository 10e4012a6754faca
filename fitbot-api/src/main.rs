mod config;
mod routes;
mod update;

use std::error::Error;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use fitbot_bot::Bot;
use fitbot_db::{Connection, ProfileRepositoryImpl};
use log::info;

use crate::{config::Config, routes::WebhookSecret};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    log4rs::init_file("log4rs.yml", Default::default())?;
    dotenv().ok();
    let config = Config::from_env()?;

    info!("Connecting to database");
    let conn = Connection::establish(&config.database_url, config.max_connections).await?;
    let repository = ProfileRepositoryImpl::new(conn.clone());
    let notifier = fitbot_client::create(&config.telegram_api_url, &config.bot_token);

    let bot = web::Data::new(Bot::new(Box::new(repository), Box::new(notifier)));
    let secret = web::Data::new(WebhookSecret(config.webhook_secret.clone()));
    if secret.0.is_none() {
        info!("No webhook secret configured, accepting every caller");
    }

    info!("Listening on {}:{}", config.bind_address, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(bot.clone())
            .app_data(secret.clone())
            .configure(routes::configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await?;

    conn.close().await;
    Ok(())
}
