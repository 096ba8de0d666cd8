use actix_web::{middleware, App, HttpServer};

use grocery_lists::{handlers, Config, Store};

fn to_io(err: grocery_lists::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;
    let store = Store::open(&config).map_err(to_io)?;

    log::info!("starting HTTP server at http://{}", config.bind_addr);

    let server_store = store.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(handlers::routes(server_store.clone()))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await;

    store.close();
    result
}
