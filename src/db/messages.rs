use sea_orm::prelude::Expr;
use sea_orm::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::attachments::{self, AttachmentCategory, NewAttachment};
use crate::models::messages::{self, CreateMessage, MessageFilter};

/// Append a message to a room's log.
///
/// `seq` is the room's last sequence number plus one and `created_at` never
/// goes backwards within the room. Callers hold the room's append lock.
pub async fn insert_message<C: ConnectionTrait>(
    db: &C,
    input: CreateMessage,
) -> Result<messages::Model, DbErr> {
    let last = get_latest_message_for_room(db, input.chat_room_id).await?;

    let mut created_at = chrono::Utc::now();
    let mut seq = 1;
    if let Some(last) = last {
        seq = last.seq + 1;
        if created_at <= last.created_at {
            created_at = last.created_at + chrono::Duration::microseconds(1);
        }
    }

    let new_message = messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        chat_room_id: Set(input.chat_room_id),
        sender_id: Set(input.sender_id),
        seq: Set(seq),
        content: Set(input.content),
        message_type: Set(input.message_type),
        is_read: Set(false),
        is_pinned: Set(false),
        has_attachment: Set(input.message_type.carries_attachment()),
        related_milestone_id: Set(input.related_milestone_id),
        related_proposal_id: Set(input.related_proposal_id),
        created_at: Set(created_at),
    };

    new_message.insert(db).await
}

pub async fn insert_attachment<C: ConnectionTrait>(
    db: &C,
    message_id: Uuid,
    uploaded_by: Uuid,
    file: NewAttachment,
    category: AttachmentCategory,
    description: Option<String>,
) -> Result<attachments::Model, DbErr> {
    let attachment = attachments::ActiveModel {
        id: Set(Uuid::new_v4()),
        message_id: Set(message_id),
        uploaded_by: Set(uploaded_by),
        file_ref: Set(file.file_ref),
        file_name: Set(file.file_name),
        file_type: Set(file.file_type),
        category: Set(category),
        description: Set(description),
        uploaded_at: Set(chrono::Utc::now()),
    };

    attachment.insert(db).await
}

/// A room's messages in log order, narrowed by `filter` as seen by `viewer`.
pub async fn get_messages_by_room<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    viewer_id: Uuid,
    filter: MessageFilter,
) -> Result<Vec<messages::Model>, DbErr> {
    let mut query = messages::Entity::find().filter(messages::Column::ChatRoomId.eq(room_id));

    match filter {
        MessageFilter::All => {}
        MessageFilter::Unread => {
            query = query
                .filter(messages::Column::IsRead.eq(false))
                .filter(messages::Column::SenderId.ne(viewer_id));
        }
        MessageFilter::Pinned => {
            query = query.filter(messages::Column::IsPinned.eq(true));
        }
    }

    query.order_by_asc(messages::Column::Seq).all(db).await
}

pub async fn get_message_by_id<C: ConnectionTrait>(
    db: &C,
    message_id: Uuid,
) -> Result<Option<messages::Model>, DbErr> {
    messages::Entity::find_by_id(message_id).one(db).await
}

/// Flip `is_pinned` in place.
pub async fn toggle_pin<C: ConnectionTrait>(
    db: &C,
    message: messages::Model,
) -> Result<messages::Model, DbErr> {
    let pinned = !message.is_pinned;
    let mut active: messages::ActiveModel = message.into();
    active.is_pinned = Set(pinned);

    active.update(db).await
}

/// Mark all messages in a room as read for a reader (i.e., messages NOT sent by them).
pub async fn mark_all_read_for_room<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    reader_id: Uuid,
) -> Result<u64, DbErr> {
    let result = messages::Entity::update_many()
        .col_expr(messages::Column::IsRead, Expr::value(true))
        .filter(messages::Column::ChatRoomId.eq(room_id))
        .filter(messages::Column::SenderId.ne(reader_id))
        .filter(messages::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Count unread messages for many rooms in one query and return a room_id -> unread_count map.
pub async fn count_unread_for_rooms<C: ConnectionTrait>(
    db: &C,
    room_ids: Vec<Uuid>,
    user_id: Uuid,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if room_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let unread: Vec<Uuid> = messages::Entity::find()
        .select_only()
        .column(messages::Column::ChatRoomId)
        .filter(messages::Column::ChatRoomId.is_in(room_ids))
        .filter(messages::Column::SenderId.ne(user_id))
        .filter(messages::Column::IsRead.eq(false))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for room_id in unread {
        *counts.entry(room_id).or_insert(0) += 1;
    }

    Ok(counts)
}

pub async fn get_latest_message_for_room<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
) -> Result<Option<messages::Model>, DbErr> {
    messages::Entity::find()
        .filter(messages::Column::ChatRoomId.eq(room_id))
        .order_by_desc(messages::Column::Seq)
        .one(db)
        .await
}

/// Get latest messages for many rooms in one query and return a room_id -> message map.
pub async fn get_latest_messages_for_rooms<C: ConnectionTrait>(
    db: &C,
    room_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, messages::Model>, DbErr> {
    if room_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = messages::Entity::find()
        .filter(messages::Column::ChatRoomId.is_in(room_ids))
        .order_by_asc(messages::Column::ChatRoomId)
        .order_by_desc(messages::Column::Seq)
        .all(db)
        .await?;

    let mut latest: HashMap<Uuid, messages::Model> = HashMap::new();
    let mut seen: HashSet<Uuid> = HashSet::new();

    for row in rows {
        if seen.insert(row.chat_room_id) {
            latest.insert(row.chat_room_id, row);
        }
    }

    Ok(latest)
}
