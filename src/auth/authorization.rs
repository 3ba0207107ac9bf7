//! Room and job membership checks. Every operation that reads or mutates a
//! room or job goes through one of these first.

use sea_orm::ConnectionTrait;
use tracing::warn;
use uuid::Uuid;

use crate::db::rooms as room_db;
use crate::error::CoreError;
use crate::models::chat_rooms;
use crate::models::jobs;

/// Which side of a room an actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Client,
    Freelancer,
}

pub fn participant(room: &chat_rooms::Model, actor: Uuid) -> Option<Participant> {
    if room.client_id == actor {
        Some(Participant::Client)
    } else if room.freelancer_id == actor {
        Some(Participant::Freelancer)
    } else {
        None
    }
}

/// The other party of the room.
pub fn counterpart(room: &chat_rooms::Model, participant: Participant) -> Uuid {
    match participant {
        Participant::Client => room.freelancer_id,
        Participant::Freelancer => room.client_id,
    }
}

pub fn require_member(room: &chat_rooms::Model, actor: Uuid) -> Result<Participant, CoreError> {
    participant(room, actor).ok_or_else(|| {
        warn!(room_id = %room.id, %actor, "non-member denied");
        CoreError::unauthorized("You are not a participant in this chat room")
    })
}

pub fn require_client(room: &chat_rooms::Model, actor: Uuid) -> Result<(), CoreError> {
    match participant(room, actor) {
        Some(Participant::Client) => Ok(()),
        _ => {
            warn!(room_id = %room.id, %actor, "client-only action denied");
            Err(CoreError::unauthorized("Only the client can do this"))
        }
    }
}

pub fn require_freelancer(room: &chat_rooms::Model, actor: Uuid) -> Result<(), CoreError> {
    match participant(room, actor) {
        Some(Participant::Freelancer) => Ok(()),
        _ => {
            warn!(room_id = %room.id, %actor, "freelancer-only action denied");
            Err(CoreError::unauthorized("Only the freelancer can do this"))
        }
    }
}

/// Load a room and confirm the actor belongs to it.
pub async fn authorize_room<C: ConnectionTrait>(
    db: &C,
    room_id: Uuid,
    actor: Uuid,
) -> Result<(chat_rooms::Model, Participant), CoreError> {
    let room = room_db::get_room_by_id(db, room_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("Chat room {room_id}")))?;

    let side = require_member(&room, actor)?;
    Ok((room, side))
}

pub fn require_job_client(job: &jobs::Model, actor: Uuid) -> Result<(), CoreError> {
    if job.client_id == actor {
        Ok(())
    } else {
        warn!(job_id = %job.id, %actor, "client-only job action denied");
        Err(CoreError::unauthorized("Only the job's client can do this"))
    }
}

pub fn require_job_provider(job: &jobs::Model, actor: Uuid) -> Result<(), CoreError> {
    if job.provider_id == Some(actor) {
        Ok(())
    } else {
        warn!(job_id = %job.id, %actor, "provider-only job action denied");
        Err(CoreError::unauthorized("Only the assigned provider can do this"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat_rooms::RoomStatus;

    fn room(client: Uuid, freelancer: Uuid) -> chat_rooms::Model {
        let now = chrono::Utc::now();
        chat_rooms::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            client_id: client,
            freelancer_id: freelancer,
            is_active: true,
            project_status: RoomStatus::Discussion,
            budget: None,
            deadline: None,
            last_milestone_message_id: None,
            last_message_at: now,
            created_at: now,
        }
    }

    #[test]
    fn only_the_two_parties_are_members() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let r = room(a, b);

        assert_eq!(participant(&r, a), Some(Participant::Client));
        assert_eq!(participant(&r, b), Some(Participant::Freelancer));
        assert_eq!(participant(&r, c), None);
        assert!(matches!(require_member(&r, c), Err(CoreError::Unauthorized(_))));
    }

    #[test]
    fn counterpart_is_the_other_side() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let r = room(a, b);

        assert_eq!(counterpart(&r, Participant::Client), b);
        assert_eq!(counterpart(&r, Participant::Freelancer), a);
    }

    #[test]
    fn role_checks_reject_the_other_party() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let r = room(a, b);

        assert!(require_client(&r, a).is_ok());
        assert!(require_client(&r, b).is_err());
        assert!(require_freelancer(&r, b).is_ok());
        assert!(require_freelancer(&r, a).is_err());
    }
}
