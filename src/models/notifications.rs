use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "chat_message")]
    ChatMessage,
    #[sea_orm(string_value = "status_change")]
    StatusChange,
    #[sea_orm(string_value = "proposal_update")]
    ProposalUpdate,
    #[sea_orm(string_value = "review_requested")]
    ReviewRequested,
    #[sea_orm(string_value = "file_uploaded")]
    FileUploaded,
    #[sea_orm(string_value = "milestone_completed")]
    MilestoneCompleted,
    #[sea_orm(string_value = "milestone_due_soon")]
    MilestoneDueSoon,
    #[sea_orm(string_value = "bid_submitted")]
    BidSubmitted,
    #[sea_orm(string_value = "bid_accepted")]
    BidAccepted,
    #[sea_orm(string_value = "bid_rejected")]
    BidRejected,
    #[sea_orm(string_value = "contract_confirmed")]
    ContractConfirmed,
    #[sea_orm(string_value = "job_status_updated")]
    JobStatusUpdated,
    #[sea_orm(string_value = "job_deleted")]
    JobDeleted,
}

/// SeaORM entity for the `notifications` table, written by the
/// database-backed emitter.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub kind: NotificationKind,
    pub chat_room_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub transport_request_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
