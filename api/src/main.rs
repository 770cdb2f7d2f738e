#![forbid(unsafe_code)]

use actix_web::{
    App,
    HttpResponse,
    HttpServer,
    Responder,
    get,
    middleware::from_fn
};
use fritter_core::{
    ensure_indexes,
    env,
    init_mongo,
    init_otel,
    init_redis,
    shutdown_otel
};

mod error;
mod handlers;
mod middleware;
mod models;
mod validate;


#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    HttpResponse::NoContent().finish()
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_otel("api", env!("CARGO_PKG_VERSION"))?;

    init_mongo(true).await?;

    ensure_indexes().await?;

    init_redis().await?;

    HttpServer::new(|| {
        App::new()
            .wrap(from_fn(middleware::otel))
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .service(healthcheck)
            .configure(handlers::user)
            .configure(handlers::freet)
            .configure(handlers::comment)
            .configure(handlers::like)
            .configure(handlers::bookmark)
            .configure(handlers::group)
    })
    .bind((env().bind_address.as_str(), env().port))?
    .run()
    .await?;

    shutdown_otel()
}
