use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        file_upload::{repository_pg::FilePgRepository, service::FileUploadService},
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
        websocket::{handler::websocket_handler, server::ChatServer},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Migration error: {e}")))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let ws_server = ChatServer::default().start();

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let message_repo = MessageRepositoryPg::new(db_pool.clone());
    let file_repo = FilePgRepository::new(db_pool.clone());

    let user_service =
        UserService::with_dependencies(Arc::new(user_repo), Arc::new(redis_pool.clone()));
    let message_service =
        MessageService::with_dependencies(Arc::new(message_repo), Arc::new(ws_server.clone()));
    let file_service = FileUploadService::with_defaults(Arc::new(file_repo));

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            // Auth của WebSocket là in-band (frame `auth` đầu tiên),
            // nên route này nằm ngoài authentication middleware
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api").configure(modules::user::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::message::route::configure)
                        .service(
                            web::scope("/files")
                                .configure(modules::file_upload::route::configure::<FilePgRepository>),
                        ),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
