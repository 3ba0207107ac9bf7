use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    #[sea_orm(string_value = "regular")]
    Regular,
    #[sea_orm(string_value = "milestone")]
    Milestone,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "revision")]
    Revision,
    #[sea_orm(string_value = "agreement")]
    Agreement,
    #[sea_orm(string_value = "status_change")]
    StatusChange,
    #[sea_orm(string_value = "file_share")]
    FileShare,
    #[sea_orm(string_value = "proposal")]
    Proposal,
}

impl MessageType {
    pub fn carries_attachment(self) -> bool {
        self == MessageType::FileShare
    }
}

/// SeaORM entity for the `messages` table.
///
/// `seq` is assigned under the room lock and orders the room's history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub chat_room_id: Uuid,
    pub sender_id: Uuid,
    pub seq: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub is_pinned: bool,
    pub has_attachment: bool,
    pub related_milestone_id: Option<Uuid>,
    pub related_proposal_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chat_rooms::Entity",
        from = "Column::ChatRoomId",
        to = "super::chat_rooms::Column::Id"
    )]
    ChatRoom,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
}

impl Related<super::chat_rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatRoom.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// DTO for creating a new message (used internally by the chat service).
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub chat_room_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub message_type: MessageType,
    pub related_milestone_id: Option<Uuid>,
    pub related_proposal_id: Option<Uuid>,
}

/// Request body for `POST /api/chat/rooms/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
    #[serde(default = "default_message_type")]
    pub message_type: MessageType,
    pub related_milestone_id: Option<Uuid>,
    pub related_proposal_id: Option<Uuid>,
}

fn default_message_type() -> MessageType {
    MessageType::Regular
}

/// Response DTO for messages sent over WebSocket and REST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub chat_room_id: Uuid,
    pub sender_id: Uuid,
    pub seq: i64,
    pub content: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub is_pinned: bool,
    pub has_attachment: bool,
    pub related_milestone_id: Option<Uuid>,
    pub related_proposal_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Model> for MessageResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            chat_room_id: m.chat_room_id,
            sender_id: m.sender_id,
            seq: m.seq,
            content: m.content,
            message_type: m.message_type,
            is_read: m.is_read,
            is_pinned: m.is_pinned,
            has_attachment: m.has_attachment,
            related_milestone_id: m.related_milestone_id,
            related_proposal_id: m.related_proposal_id,
            created_at: m.created_at,
        }
    }
}

/// Which view of the room history to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFilter {
    #[default]
    All,
    Unread,
    Pinned,
}

/// Query parameters for the message history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub filter: MessageFilter,
}
