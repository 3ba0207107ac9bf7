use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use marketplace_core::auth::JwtSecret;
use marketplace_core::cache::{RedisCache, RoomListCache};
use marketplace_core::chat::ChatBroadcaster;
use marketplace_core::config::AppConfig;
use marketplace_core::create_pool;
use marketplace_core::external::{
    DbLedger, DbNotificationEmitter, DbProviderDirectory, GoogleRouteOracle, NotificationEmitter,
};
use marketplace_core::handlers;
use marketplace_core::services::{BidEngine, ChatService};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    tracing::info!("Connected to database");

    let redis = RedisCache::new(&config.redis_url)
        .await
        .map_err(io::Error::other)?;
    let room_cache = RoomListCache::new(Arc::new(redis), config.room_cache_ttl);
    tracing::info!("Connected to Redis");

    let notifier: Arc<dyn NotificationEmitter> = Arc::new(DbNotificationEmitter::new(db.clone()));
    let broadcaster = Arc::new(ChatBroadcaster::new());

    let chat = ChatService::new(db.clone(), broadcaster, notifier.clone())
        .with_room_cache(room_cache);
    let engine = BidEngine::new(
        db.clone(),
        notifier,
        Arc::new(DbProviderDirectory::new(db.clone())),
        Arc::new(DbLedger::new(db.clone())),
        Arc::new(GoogleRouteOracle::new(
            &config.google_maps_api_key,
            config.route_cache_ttl,
        )),
    );

    let db_data = web::Data::new(db);
    let chat_data = web::Data::new(chat);
    let engine_data = web::Data::new(engine);
    let secret_data = web::Data::new(JwtSecret(config.jwt_secret.clone()));

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(secret_data.clone())
            .app_data(chat_data.clone())
            .app_data(engine_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
