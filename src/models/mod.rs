pub mod attachments;
pub mod bids;
pub mod chat_rooms;
pub mod contracts;
pub mod jobs;
pub mod messages;
pub mod milestones;
pub mod notifications;
pub mod projects;
pub mod templates;
pub mod users;
pub mod vehicles;
pub mod wallets;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).min(100)
    }
}
