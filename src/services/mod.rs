pub mod bidding;
pub mod chat;
pub mod eligibility;
pub mod pricing;
pub mod status_sync;
pub mod templates;

pub use bidding::BidEngine;
pub use chat::ChatService;
