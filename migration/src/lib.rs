pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_projects_table;
mod m20250301_000003_create_chat_tables;
mod m20250301_000004_create_transport_tables;
mod m20250301_000005_create_notifications_table;
mod m20250301_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_projects_table::Migration),
            Box::new(m20250301_000003_create_chat_tables::Migration),
            Box::new(m20250301_000004_create_transport_tables::Migration),
            Box::new(m20250301_000005_create_notifications_table::Migration),
            Box::new(m20250301_000006_add_indexes::Migration),
        ]
    }
}
