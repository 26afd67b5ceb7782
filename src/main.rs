use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use tasklist::{config::Config, routes, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let state = AppState::from_config(&config)
        .await
        .map_err(startup_error)?;

    log::info!("Starting tasklist server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.authenticator.clone())
            .app_data(state.tasks.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn startup_error(err: tasklist::AppError) -> io::Error {
    log::error!("startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}
