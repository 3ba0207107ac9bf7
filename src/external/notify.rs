use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::warn;
use uuid::Uuid;

use crate::db::notifications::{self as notification_db, NewNotification};
use crate::error::CoreError;
use crate::models::notifications::NotificationKind;

/// The entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Room { room_id: Uuid, message_id: Option<Uuid> },
    Job(Uuid),
    None,
}

/// One structured event for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub recipient: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub link: EntityRef,
}

impl NotificationEvent {
    pub fn new(
        recipient: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        link: EntityRef,
    ) -> Self {
        Self {
            recipient,
            title: title.into(),
            body: body.into(),
            kind,
            link,
        }
    }
}

/// Sink for notification events. Persistence and delivery belong to the
/// implementation; callers never retry.
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    async fn emit(&self, event: NotificationEvent) -> Result<(), CoreError>;

    /// Mark the user's unread notifications for a room as read.
    async fn clear_unread(&self, user_id: Uuid, room_id: Uuid) -> Result<(), CoreError>;
}

/// Emit each event once, logging and dropping failures.
pub async fn emit_all(emitter: &dyn NotificationEmitter, events: Vec<NotificationEvent>) {
    for event in events {
        let recipient = event.recipient;
        let kind = event.kind;
        if let Err(e) = emitter.emit(event).await {
            warn!(%recipient, ?kind, error = %e, "notification emit failed");
        }
    }
}

/// Writes events to the `notifications` table.
#[derive(Clone)]
pub struct DbNotificationEmitter {
    db: DatabaseConnection,
}

impl DbNotificationEmitter {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationEmitter for DbNotificationEmitter {
    async fn emit(&self, event: NotificationEvent) -> Result<(), CoreError> {
        let (chat_room_id, message_id, transport_request_id) = match event.link {
            EntityRef::Room {
                room_id,
                message_id,
            } => (Some(room_id), message_id, None),
            EntityRef::Job(job_id) => (None, None, Some(job_id)),
            EntityRef::None => (None, None, None),
        };

        notification_db::insert_notification(
            &self.db,
            NewNotification {
                user_id: event.recipient,
                title: event.title,
                body: event.body,
                kind: event.kind,
                chat_room_id,
                message_id,
                transport_request_id,
            },
        )
        .await?;

        Ok(())
    }

    async fn clear_unread(&self, user_id: Uuid, room_id: Uuid) -> Result<(), CoreError> {
        notification_db::mark_room_notifications_read(&self.db, user_id, room_id).await?;
        Ok(())
    }
}
