use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::notifications::{self, NotificationKind};

/// Columns of a notification row, before an id and timestamp are assigned.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub chat_room_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub transport_request_id: Option<Uuid>,
}

pub async fn insert_notification<C: ConnectionTrait>(
    db: &C,
    input: NewNotification,
) -> Result<notifications::Model, DbErr> {
    let row = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        title: Set(input.title),
        body: Set(input.body),
        kind: Set(input.kind),
        chat_room_id: Set(input.chat_room_id),
        message_id: Set(input.message_id),
        transport_request_id: Set(input.transport_request_id),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    row.insert(db).await
}

/// Mark a user's unread chat notifications for one room as read.
pub async fn mark_room_notifications_read<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    room_id: Uuid,
) -> Result<u64, DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::ChatRoomId.eq(room_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn get_notifications_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .all(db)
        .await
}
