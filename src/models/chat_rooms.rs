use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cached copy of the project's status, as shown inside the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[sea_orm(string_value = "discussion")]
    Discussion,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "review")]
    Review,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "disputed")]
    Disputed,
}

/// SeaORM entity for the `chat_rooms` table. One room per project.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub is_active: bool,
    pub project_status: RoomStatus,
    #[sea_orm(column_type = "Double", nullable)]
    pub budget: Option<f64>,
    pub deadline: Option<DateTimeUtc>,
    pub last_milestone_message_id: Option<Uuid>,
    pub last_message_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
    #[sea_orm(has_many = "super::milestones::Entity")]
    Milestones,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Row of the room list: one per active room the caller belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: Uuid,
    pub project_id: Uuid,
    pub project_title: String,
    pub other_user_id: Uuid,
    pub other_user_name: Option<String>,
    pub project_status: RoomStatus,
    pub last_message: Option<String>,
    pub last_message_at: Option<chrono::DateTime<chrono::Utc>>,
    pub unread_count: u64,
    pub pending_milestones: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeProjectStatus {
    pub status: super::projects::ProjectStatus,
}

/// Everything the room page needs in one response.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetail {
    pub room: Model,
    pub project_title: String,
    pub messages: Vec<super::messages::MessageResponse>,
    pub pinned: Vec<super::messages::MessageResponse>,
    pub milestones: Vec<super::milestones::Model>,
}
