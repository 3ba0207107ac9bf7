use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::chat_rooms::{self, RoomStatus};
use crate::models::projects;
use crate::models::{attachments, messages, milestones};

pub async fn get_room_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<chat_rooms::Model>, DbErr> {
    chat_rooms::Entity::find_by_id(id).one(db).await
}

pub async fn get_room_by_project<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
) -> Result<Option<chat_rooms::Model>, DbErr> {
    chat_rooms::Entity::find()
        .filter(chat_rooms::Column::ProjectId.eq(project_id))
        .one(db)
        .await
}

/// Insert a room for a project, copying budget and deadline from it.
pub async fn insert_room<C: ConnectionTrait>(
    db: &C,
    project: &projects::Model,
    freelancer_id: Uuid,
    status: RoomStatus,
) -> Result<chat_rooms::Model, DbErr> {
    let now = chrono::Utc::now();
    let room = chat_rooms::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project.id),
        client_id: Set(project.client_id),
        freelancer_id: Set(freelancer_id),
        is_active: Set(true),
        project_status: Set(status),
        budget: Set(Some(project.budget)),
        deadline: Set(project.deadline),
        last_milestone_message_id: Set(None),
        last_message_at: Set(now),
        created_at: Set(now),
    };

    room.insert(db).await
}

/// Active rooms where the user is either party, most recently active first.
pub async fn get_active_rooms_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<chat_rooms::Model>, DbErr> {
    chat_rooms::Entity::find()
        .filter(chat_rooms::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(chat_rooms::Column::ClientId.eq(user_id))
                .add(chat_rooms::Column::FreelancerId.eq(user_id)),
        )
        .order_by_desc(chat_rooms::Column::LastMessageAt)
        .all(db)
        .await
}

/// Write the cached status only when it differs. Returns whether a row changed.
pub async fn set_room_status<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    status: RoomStatus,
) -> Result<bool, DbErr> {
    let result = chat_rooms::Entity::update_many()
        .col_expr(chat_rooms::Column::ProjectStatus, Expr::value(status))
        .filter(chat_rooms::Column::Id.eq(room_id))
        .filter(chat_rooms::Column::ProjectStatus.ne(status))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

pub async fn touch_last_message<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr> {
    chat_rooms::Entity::update_many()
        .col_expr(chat_rooms::Column::LastMessageAt, Expr::value(at))
        .filter(chat_rooms::Column::Id.eq(room_id))
        .exec(db)
        .await?;

    Ok(())
}

pub async fn set_last_milestone_message<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    message_id: Option<Uuid>,
) -> Result<(), DbErr> {
    chat_rooms::Entity::update_many()
        .col_expr(
            chat_rooms::Column::LastMilestoneMessageId,
            Expr::value(message_id),
        )
        .filter(chat_rooms::Column::Id.eq(room_id))
        .exec(db)
        .await?;

    Ok(())
}

pub async fn deactivate_room<C: ConnectionTrait>(db: &C, room_id: Uuid) -> Result<(), DbErr> {
    chat_rooms::Entity::update_many()
        .col_expr(chat_rooms::Column::IsActive, Expr::value(false))
        .filter(chat_rooms::Column::Id.eq(room_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Remove a room and everything it owns, children first:
/// attachments, messages, milestones, then the room itself.
pub async fn delete_room_cascade<C: ConnectionTrait>(db: &C, room_id: Uuid) -> Result<(), DbErr> {
    set_last_milestone_message(db, room_id, None).await?;

    let message_ids: Vec<Uuid> = messages::Entity::find()
        .select_only()
        .column(messages::Column::Id)
        .filter(messages::Column::ChatRoomId.eq(room_id))
        .into_tuple()
        .all(db)
        .await?;

    if !message_ids.is_empty() {
        attachments::Entity::delete_many()
            .filter(attachments::Column::MessageId.is_in(message_ids))
            .exec(db)
            .await?;
    }

    messages::Entity::delete_many()
        .filter(messages::Column::ChatRoomId.eq(room_id))
        .exec(db)
        .await?;

    milestones::Entity::delete_many()
        .filter(milestones::Column::ChatRoomId.eq(room_id))
        .exec(db)
        .await?;

    chat_rooms::Entity::delete_by_id(room_id).exec(db).await?;

    Ok(())
}
