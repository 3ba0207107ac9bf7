pub mod bids;
pub mod contracts;
pub mod jobs;
pub mod messages;
pub mod milestones;
pub mod notifications;
pub mod projects;
pub mod rooms;
pub mod templates;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Create a SeaORM connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.max_connections(20)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(opts).await
}
