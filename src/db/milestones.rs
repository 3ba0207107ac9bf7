use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::milestones::{self, CreateMilestone};

pub async fn insert_milestone<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    input: CreateMilestone,
) -> Result<milestones::Model, DbErr> {
    let milestone = milestones::ActiveModel {
        id: Set(Uuid::new_v4()),
        chat_room_id: Set(room_id),
        title: Set(input.title),
        description: Set(input.description),
        due_date: Set(input.due_date),
        amount: Set(input.amount),
        is_completed: Set(false),
        completed_at: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    milestone.insert(db).await
}

pub async fn get_milestone_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<milestones::Model>, DbErr> {
    milestones::Entity::find_by_id(id).one(db).await
}

/// Set the completion flag and timestamp together.
pub async fn mark_completed<C: ConnectionTrait>(
    db: &C,
    milestone: milestones::Model,
) -> Result<milestones::Model, DbErr> {
    let mut active: milestones::ActiveModel = milestone.into();
    active.is_completed = Set(true);
    active.completed_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

pub async fn get_milestones_by_room<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
) -> Result<Vec<milestones::Model>, DbErr> {
    milestones::Entity::find()
        .filter(milestones::Column::ChatRoomId.eq(room_id))
        .order_by_asc(milestones::Column::DueDate)
        .all(db)
        .await
}

/// Incomplete milestones still due in the future, counted per room.
pub async fn count_pending_for_rooms<C: ConnectionTrait>(
    db: &C,
    room_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if room_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let pending: Vec<Uuid> = milestones::Entity::find()
        .select_only()
        .column(milestones::Column::ChatRoomId)
        .filter(milestones::Column::ChatRoomId.is_in(room_ids))
        .filter(milestones::Column::IsCompleted.eq(false))
        .filter(milestones::Column::DueDate.gt(chrono::Utc::now()))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for room_id in pending {
        *counts.entry(room_id).or_insert(0) += 1;
    }

    Ok(counts)
}
