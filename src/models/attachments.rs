use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentCategory {
    #[sea_orm(string_value = "proposal")]
    Proposal,
    #[sea_orm(string_value = "contract")]
    Contract,
    #[sea_orm(string_value = "deliverable")]
    Deliverable,
    #[sea_orm(string_value = "revision")]
    Revision,
    #[sea_orm(string_value = "reference")]
    Reference,
    #[default]
    #[sea_orm(string_value = "other")]
    Other,
}

/// SeaORM entity for the `message_attachments` table. `file_ref` points into
/// external file storage; the bytes never pass through this service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message_attachments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub message_id: Uuid,
    pub uploaded_by: Uuid,
    #[sea_orm(column_type = "Text")]
    pub file_ref: String,
    pub file_name: String,
    pub file_type: String,
    pub category: AttachmentCategory,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::messages::Entity",
        from = "Column::MessageId",
        to = "super::messages::Column::Id"
    )]
    Message,
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct NewAttachment {
    pub file_ref: String,
    pub file_name: String,
    pub file_type: String,
}

/// Request body for `POST /api/chat/rooms/{id}/attachments`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAttachments {
    pub files: Vec<NewAttachment>,
    #[serde(default)]
    pub category: AttachmentCategory,
    pub description: Option<String>,
}
