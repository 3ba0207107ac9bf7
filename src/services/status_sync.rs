//! Keeps a room's cached project status in line with the project row.
//!
//! There is no background job: the cache is refreshed when a room is opened
//! and when its status is changed through the chat, so it can lag behind
//! changes made elsewhere until the next access.

use sea_orm::ConnectionTrait;
use tracing::info;

use crate::db::{projects as project_db, rooms as room_db};
use crate::error::CoreError;
use crate::models::chat_rooms::{self, RoomStatus};
use crate::models::projects::ProjectStatus;

/// Project status to room status. Anything unmapped reads as DISCUSSION.
pub fn map_status(status: ProjectStatus) -> RoomStatus {
    match status {
        ProjectStatus::Open => RoomStatus::Discussion,
        ProjectStatus::InProgress => RoomStatus::InProgress,
        ProjectStatus::Completed => RoomStatus::Completed,
        ProjectStatus::Disputed => RoomStatus::Disputed,
        _ => RoomStatus::Discussion,
    }
}

/// Re-read the project and write the mapped status onto the room if it differs.
pub async fn sync<C: ConnectionTrait>(
    db: &C,
    mut room: chat_rooms::Model,
) -> Result<chat_rooms::Model, CoreError> {
    let project = project_db::get_project_by_id(db, room.project_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("Project {}", room.project_id)))?;

    let mapped = map_status(project.status);
    if mapped != room.project_status && room_db::set_room_status(db, room.id, mapped).await? {
        info!(room_id = %room.id, from = ?room.project_status, to = ?mapped, "room status synced");
        room.project_status = mapped;
    }

    Ok(room)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_statuses() {
        assert_eq!(map_status(ProjectStatus::Open), RoomStatus::Discussion);
        assert_eq!(map_status(ProjectStatus::InProgress), RoomStatus::InProgress);
        assert_eq!(map_status(ProjectStatus::Completed), RoomStatus::Completed);
        assert_eq!(map_status(ProjectStatus::Disputed), RoomStatus::Disputed);
    }

    #[test]
    fn unmapped_statuses_fall_back_to_discussion() {
        assert_eq!(map_status(ProjectStatus::Review), RoomStatus::Discussion);
        assert_eq!(map_status(ProjectStatus::Discussion), RoomStatus::Discussion);
    }
}
