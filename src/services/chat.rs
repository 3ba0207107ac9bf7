use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::authorization::{
    Participant, authorize_room, counterpart, participant, require_client, require_freelancer,
    require_member,
};
use crate::cache::RoomListCache;
use crate::chat::broadcaster::ChatBroadcaster;
use crate::chat::protocol::ServerMessage;
use crate::db::messages as message_db;
use crate::db::milestones as milestone_db;
use crate::db::projects as project_db;
use crate::db::rooms as room_db;
use crate::db::users as user_db;
use crate::error::CoreError;
use crate::external::notify::{EntityRef, NotificationEmitter, NotificationEvent, emit_all};
use crate::models::attachments::{self, UploadAttachments};
use crate::models::chat_rooms::{self, RoomDetail, RoomSummary};
use crate::models::messages::{
    self, CreateMessage, MessageFilter, MessageResponse, MessageType, PostMessageRequest,
};
use crate::models::milestones::{self, CreateMilestone};
use crate::models::notifications::NotificationKind;
use crate::models::projects::ProjectStatus;
use crate::services::status_sync;

pub const WELCOME_MESSAGE: &str = "Welcome to the chatroom!";

const PREVIEW_CHARS: usize = 50;

/// Project chat rooms: access, messages, milestones and the fan-out that
/// follows every stored message.
///
/// Each write that stores a message holds the room's append lock from insert
/// through commit and broadcast, so live delivery order matches `seq` order.
/// Notifications go out after the lock is released.
#[derive(Clone)]
pub struct ChatService {
    db: DatabaseConnection,
    broadcaster: Arc<ChatBroadcaster>,
    notifier: Arc<dyn NotificationEmitter>,
    room_cache: Option<RoomListCache>,
}

impl ChatService {
    pub fn new(
        db: DatabaseConnection,
        broadcaster: Arc<ChatBroadcaster>,
        notifier: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            db,
            broadcaster,
            notifier,
            room_cache: None,
        }
    }

    pub fn with_room_cache(mut self, cache: RoomListCache) -> Self {
        self.room_cache = Some(cache);
        self
    }

    pub fn broadcaster(&self) -> &Arc<ChatBroadcaster> {
        &self.broadcaster
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // ── Rooms ──

    /// Get or create the room for a project. Only the project's client or
    /// assigned freelancer may open it.
    pub async fn open_room(
        &self,
        project_id: Uuid,
        actor: Uuid,
    ) -> Result<chat_rooms::Model, CoreError> {
        let project = project_db::get_project_by_id(&self.db, project_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Project {project_id}")))?;

        if let Some(room) = room_db::get_room_by_project(&self.db, project_id).await? {
            require_member(&room, actor)?;
            return status_sync::sync(&self.db, room).await;
        }

        let freelancer_id = project
            .freelancer_id
            .ok_or_else(|| CoreError::validation("Project has no assigned freelancer yet"))?;

        if actor != project.client_id && actor != freelancer_id {
            warn!(%project_id, %actor, "room open denied");
            return Err(CoreError::unauthorized(
                "Only the project's client or freelancer can open its chat",
            ));
        }

        let txn = self.db.begin().await?;
        let room = match room_db::insert_room(
            &txn,
            &project,
            freelancer_id,
            status_sync::map_status(project.status),
        )
        .await
        {
            Ok(room) => room,
            Err(e) => {
                drop(txn);
                // Another request created it first.
                if let Some(room) = room_db::get_room_by_project(&self.db, project_id).await? {
                    return Ok(room);
                }
                return Err(e.into());
            }
        };

        let welcome = message_db::insert_message(
            &txn,
            CreateMessage {
                chat_room_id: room.id,
                sender_id: actor,
                content: WELCOME_MESSAGE.to_string(),
                message_type: MessageType::Regular,
                related_milestone_id: None,
                related_proposal_id: None,
            },
        )
        .await?;
        room_db::touch_last_message(&txn, room.id, welcome.created_at).await?;
        txn.commit().await?;

        info!(room_id = %room.id, %project_id, %actor, "chat room created");

        if let Ok(side) = require_member(&room, actor) {
            self.after_message(&room, side, &welcome).await;
        }
        Ok(room)
    }

    /// Room page: syncs the status cache, marks the room read for the viewer
    /// and returns messages, pins and milestones.
    pub async fn room_detail(&self, room_id: Uuid, actor: Uuid) -> Result<RoomDetail, CoreError> {
        let (room, _) = authorize_room(&self.db, room_id, actor).await?;
        let room = status_sync::sync(&self.db, room).await?;
        self.mark_room_read(&room, actor).await?;

        let project_title = project_db::get_project_by_id(&self.db, room.project_id)
            .await?
            .map(|p| p.title)
            .unwrap_or_default();

        let messages: Vec<MessageResponse> =
            message_db::get_messages_by_room(&self.db, room.id, actor, MessageFilter::All)
                .await?
                .into_iter()
                .map(MessageResponse::from)
                .collect();
        let pinned = messages.iter().filter(|m| m.is_pinned).cloned().collect();
        let milestones = milestone_db::get_milestones_by_room(&self.db, room.id).await?;

        Ok(RoomDetail {
            room,
            project_title,
            messages,
            pinned,
            milestones,
        })
    }

    /// Active rooms for the actor, most recently active first.
    pub async fn list_rooms(&self, actor: Uuid) -> Result<Vec<RoomSummary>, CoreError> {
        if let Some(cache) = &self.room_cache {
            if let Some(hit) = cache.get(actor).await {
                return Ok(hit);
            }
        }

        let rooms = room_db::get_active_rooms_for_user(&self.db, actor).await?;
        let room_ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();

        let unread = message_db::count_unread_for_rooms(&self.db, room_ids.clone(), actor).await?;
        let latest = message_db::get_latest_messages_for_rooms(&self.db, room_ids.clone()).await?;
        let pending = milestone_db::count_pending_for_rooms(&self.db, room_ids).await?;
        let projects = project_db::get_projects_by_ids(
            &self.db,
            rooms.iter().map(|r| r.project_id).collect(),
        )
        .await?;

        let others: Vec<(chat_rooms::Model, Uuid)> = rooms
            .into_iter()
            .filter_map(|room| {
                let side = participant(&room, actor)?;
                let other = counterpart(&room, side);
                Some((room, other))
            })
            .collect();
        let users =
            user_db::get_users_by_ids(&self.db, others.iter().map(|(_, u)| *u).collect()).await?;

        let mut summaries: Vec<RoomSummary> = others
            .into_iter()
            .map(|(room, other_user_id)| {
                let last = latest.get(&room.id);
                RoomSummary {
                    room_id: room.id,
                    project_id: room.project_id,
                    project_title: projects
                        .get(&room.project_id)
                        .map(|p| p.title.clone())
                        .unwrap_or_default(),
                    other_user_id,
                    other_user_name: users.get(&other_user_id).map(|u| u.full_name()),
                    project_status: room.project_status,
                    last_message: last.map(|m| m.content.clone()),
                    last_message_at: last.map(|m| m.created_at),
                    unread_count: unread.get(&room.id).copied().unwrap_or(0),
                    pending_milestones: pending.get(&room.id).copied().unwrap_or(0),
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));

        if let Some(cache) = &self.room_cache {
            cache.put(actor, &summaries).await;
        }
        Ok(summaries)
    }

    pub async fn deactivate_room(&self, room_id: Uuid, actor: Uuid) -> Result<(), CoreError> {
        let (room, _) = authorize_room(&self.db, room_id, actor).await?;
        room_db::deactivate_room(&self.db, room.id).await?;
        info!(%room_id, %actor, "chat room deactivated");
        self.invalidate_rooms(&room).await;
        Ok(())
    }

    /// Remove a room with its messages, attachments and milestones.
    pub async fn delete_room(&self, room_id: Uuid, actor: Uuid) -> Result<(), CoreError> {
        let (room, _) = authorize_room(&self.db, room_id, actor).await?;
        require_client(&room, actor)?;

        let txn = self.db.begin().await?;
        room_db::delete_room_cascade(&txn, room.id).await?;
        txn.commit().await?;

        info!(%room_id, %actor, "chat room deleted");
        self.invalidate_rooms(&room).await;
        Ok(())
    }

    // ── Messages ──

    pub async fn list_messages(
        &self,
        room_id: Uuid,
        actor: Uuid,
        filter: MessageFilter,
    ) -> Result<Vec<MessageResponse>, CoreError> {
        let (room, _) = authorize_room(&self.db, room_id, actor).await?;
        let rows = message_db::get_messages_by_room(&self.db, room.id, actor, filter).await?;
        Ok(rows.into_iter().map(MessageResponse::from).collect())
    }

    /// Store a message, push it to the room and notify the other party.
    pub async fn post_message(
        &self,
        room_id: Uuid,
        sender: Uuid,
        req: PostMessageRequest,
    ) -> Result<MessageResponse, CoreError> {
        let (room, side) = authorize_room(&self.db, room_id, sender).await?;

        let content = req.content.trim();
        if content.is_empty() {
            return Err(CoreError::validation("Message content cannot be empty"));
        }

        if let Some(milestone_id) = req.related_milestone_id {
            let belongs = milestone_db::get_milestone_by_id(&self.db, milestone_id)
                .await?
                .is_some_and(|m| m.chat_room_id == room.id);
            if !belongs {
                return Err(CoreError::validation(
                    "Related milestone does not belong to this room",
                ));
            }
        }

        let message = self
            .append(
                &room,
                CreateMessage {
                    chat_room_id: room.id,
                    sender_id: sender,
                    content: content.to_string(),
                    message_type: req.message_type,
                    related_milestone_id: req.related_milestone_id,
                    related_proposal_id: req.related_proposal_id,
                },
            )
            .await?;

        self.after_message(&room, side, &message).await;
        Ok(message.into())
    }

    /// Mark everything the other party sent as read. Safe to repeat.
    pub async fn mark_read(&self, room_id: Uuid, actor: Uuid) -> Result<u64, CoreError> {
        let (room, _) = authorize_room(&self.db, room_id, actor).await?;
        self.mark_room_read(&room, actor).await
    }

    pub async fn toggle_pin(
        &self,
        message_id: Uuid,
        actor: Uuid,
    ) -> Result<MessageResponse, CoreError> {
        let message = message_db::get_message_by_id(&self.db, message_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Message {message_id}")))?;
        authorize_room(&self.db, message.chat_room_id, actor).await?;

        let updated = message_db::toggle_pin(&self.db, message).await?;
        info!(%message_id, %actor, pinned = updated.is_pinned, "message pin toggled");
        Ok(updated.into())
    }

    /// Store one FILE_SHARE message carrying every uploaded file.
    pub async fn post_attachments(
        &self,
        room_id: Uuid,
        sender: Uuid,
        upload: UploadAttachments,
    ) -> Result<(MessageResponse, Vec<attachments::Model>), CoreError> {
        let (room, side) = authorize_room(&self.db, room_id, sender).await?;

        if upload.files.is_empty() {
            return Err(CoreError::validation("At least one file is required"));
        }
        if upload
            .files
            .iter()
            .any(|f| f.file_ref.trim().is_empty() || f.file_name.trim().is_empty())
        {
            return Err(CoreError::validation("Every file needs a reference and a name"));
        }

        let count = upload.files.len();
        let (message, saved) = {
            let _guard = self.broadcaster.lock_room(room.id).await;
            let txn = self.db.begin().await?;

            let message = message_db::insert_message(
                &txn,
                CreateMessage {
                    chat_room_id: room.id,
                    sender_id: sender,
                    content: format!("Uploaded {count} file(s)"),
                    message_type: MessageType::FileShare,
                    related_milestone_id: None,
                    related_proposal_id: None,
                },
            )
            .await?;

            let mut saved = Vec::with_capacity(count);
            for file in upload.files {
                saved.push(
                    message_db::insert_attachment(
                        &txn,
                        message.id,
                        sender,
                        file,
                        upload.category,
                        upload.description.clone(),
                    )
                    .await?,
                );
            }
            room_db::touch_last_message(&txn, room.id, message.created_at).await?;
            txn.commit().await?;

            self.broadcaster
                .broadcast(room.id, ServerMessage::Regular(message.clone().into()), None)
                .await;
            (message, saved)
        };

        info!(%room_id, %sender, files = count, "attachments uploaded");
        self.after_message(&room, side, &message).await;

        if let Some((project_title, sender_name)) = self.message_context(&room, sender).await {
            let recipient = counterpart(&room, side);
            let events = saved
                .iter()
                .map(|a| {
                    NotificationEvent::new(
                        recipient,
                        NotificationKind::FileUploaded,
                        "File Uploaded",
                        format!(
                            "{sender_name} uploaded a file ({}) in '{project_title}'.",
                            a.file_name
                        ),
                        EntityRef::Room {
                            room_id: room.id,
                            message_id: Some(message.id),
                        },
                    )
                })
                .collect();
            emit_all(self.notifier.as_ref(), events).await;
        }

        Ok((message.into(), saved))
    }

    /// Update the authoritative project status, refresh the room's cached
    /// copy and announce the change in the room.
    pub async fn change_project_status(
        &self,
        room_id: Uuid,
        actor: Uuid,
        status: ProjectStatus,
    ) -> Result<chat_rooms::Model, CoreError> {
        let (room, side) = authorize_room(&self.db, room_id, actor).await?;

        let (room, message) = {
            let _guard = self.broadcaster.lock_room(room.id).await;
            let txn = self.db.begin().await?;

            project_db::update_project_status(&txn, room.project_id, status).await?;
            let room = status_sync::sync(&txn, room).await?;
            let message = message_db::insert_message(
                &txn,
                CreateMessage {
                    chat_room_id: room.id,
                    sender_id: actor,
                    content: format!("Project status updated to: {status}"),
                    message_type: MessageType::StatusChange,
                    related_milestone_id: None,
                    related_proposal_id: None,
                },
            )
            .await?;
            room_db::touch_last_message(&txn, room.id, message.created_at).await?;
            txn.commit().await?;

            self.broadcaster
                .broadcast(room.id, ServerMessage::Regular(message.clone().into()), None)
                .await;
            (room, message)
        };

        info!(%room_id, %actor, %status, "project status changed");
        self.after_message(&room, side, &message).await;
        Ok(room)
    }

    // ── Milestones ──

    pub async fn list_milestones(
        &self,
        room_id: Uuid,
        actor: Uuid,
    ) -> Result<Vec<milestones::Model>, CoreError> {
        let (room, _) = authorize_room(&self.db, room_id, actor).await?;
        Ok(milestone_db::get_milestones_by_room(&self.db, room.id).await?)
    }

    /// Client-only. The milestone, its announcement message and the room's
    /// milestone pointer are written together or not at all.
    pub async fn create_milestone(
        &self,
        room_id: Uuid,
        actor: Uuid,
        input: CreateMilestone,
    ) -> Result<(milestones::Model, MessageResponse), CoreError> {
        let (room, side) = authorize_room(&self.db, room_id, actor).await?;
        require_client(&room, actor)?;

        if input.title.trim().is_empty() {
            return Err(CoreError::validation("Milestone title cannot be empty"));
        }
        if !input.amount.is_finite() || input.amount < 0.0 {
            return Err(CoreError::validation("Milestone amount must be zero or more"));
        }

        let (milestone, message) = {
            let _guard = self.broadcaster.lock_room(room.id).await;
            let txn = self.db.begin().await?;

            let milestone = milestone_db::insert_milestone(&txn, room.id, input).await?;
            let message = message_db::insert_message(
                &txn,
                CreateMessage {
                    chat_room_id: room.id,
                    sender_id: actor,
                    content: format!("Created milestone: {}", milestone.title),
                    message_type: MessageType::Milestone,
                    related_milestone_id: Some(milestone.id),
                    related_proposal_id: None,
                },
            )
            .await?;
            room_db::set_last_milestone_message(&txn, room.id, Some(message.id)).await?;
            room_db::touch_last_message(&txn, room.id, message.created_at).await?;
            txn.commit().await?;

            self.broadcaster
                .broadcast(
                    room.id,
                    ServerMessage::Milestone {
                        milestone: milestone.clone(),
                        message: message.clone().into(),
                    },
                    None,
                )
                .await;
            (milestone, message)
        };

        info!(%room_id, milestone_id = %milestone.id, "milestone created");
        self.after_message(&room, side, &message).await;

        if is_due_soon(&milestone, Utc::now().date_naive()) {
            if let Some((project_title, _)) = self.message_context(&room, actor).await {
                emit_all(
                    self.notifier.as_ref(),
                    due_soon_events(&room, &project_title, &milestone),
                )
                .await;
            }
        }

        Ok((milestone, message.into()))
    }

    /// Freelancer-only. Completing twice is rejected, including when two
    /// requests race.
    pub async fn complete_milestone(
        &self,
        milestone_id: Uuid,
        actor: Uuid,
    ) -> Result<(milestones::Model, MessageResponse), CoreError> {
        let milestone = milestone_db::get_milestone_by_id(&self.db, milestone_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Milestone {milestone_id}")))?;
        let (room, side) = authorize_room(&self.db, milestone.chat_room_id, actor).await?;
        require_freelancer(&room, actor)?;

        if milestone.is_completed {
            return Err(CoreError::AlreadyCompleted);
        }

        let (milestone, message) = {
            let _guard = self.broadcaster.lock_room(room.id).await;
            let txn = self.db.begin().await?;

            let current = milestone_db::get_milestone_by_id(&txn, milestone_id)
                .await?
                .ok_or_else(|| CoreError::not_found(format!("Milestone {milestone_id}")))?;
            if current.is_completed {
                return Err(CoreError::AlreadyCompleted);
            }

            let completed = milestone_db::mark_completed(&txn, current).await?;
            let message = message_db::insert_message(
                &txn,
                CreateMessage {
                    chat_room_id: room.id,
                    sender_id: room.freelancer_id,
                    content: format!(
                        "Milestone \"{}\" has been marked as completed.",
                        completed.title
                    ),
                    message_type: MessageType::Milestone,
                    related_milestone_id: Some(completed.id),
                    related_proposal_id: None,
                },
            )
            .await?;
            room_db::set_last_milestone_message(&txn, room.id, Some(message.id)).await?;
            room_db::touch_last_message(&txn, room.id, message.created_at).await?;
            txn.commit().await?;

            self.broadcaster
                .broadcast(
                    room.id,
                    ServerMessage::Milestone {
                        milestone: completed.clone(),
                        message: message.clone().into(),
                    },
                    None,
                )
                .await;
            (completed, message)
        };

        info!(%milestone_id, %actor, "milestone completed");
        self.after_message(&room, side, &message).await;

        if let Some((project_title, _)) = self.message_context(&room, actor).await {
            let body = format!(
                "Milestone '{}' in '{project_title}' has been completed.",
                milestone.title
            );
            let events = [room.client_id, room.freelancer_id]
                .into_iter()
                .map(|recipient| {
                    NotificationEvent::new(
                        recipient,
                        NotificationKind::MilestoneCompleted,
                        "Milestone Completed",
                        body.clone(),
                        EntityRef::Room {
                            room_id: room.id,
                            message_id: Some(message.id),
                        },
                    )
                })
                .collect();
            emit_all(self.notifier.as_ref(), events).await;
        }

        Ok((milestone, message.into()))
    }

    // ── Internals ──

    /// Persist one message under the room lock and push it live.
    async fn append(
        &self,
        room: &chat_rooms::Model,
        input: CreateMessage,
    ) -> Result<messages::Model, CoreError> {
        let _guard = self.broadcaster.lock_room(room.id).await;

        let txn = self.db.begin().await?;
        let message = message_db::insert_message(&txn, input).await?;
        room_db::touch_last_message(&txn, room.id, message.created_at).await?;
        txn.commit().await?;

        self.broadcaster
            .broadcast(room.id, ServerMessage::Regular(message.clone().into()), None)
            .await;
        Ok(message)
    }

    async fn mark_room_read(&self, room: &chat_rooms::Model, actor: Uuid) -> Result<u64, CoreError> {
        let updated = message_db::mark_all_read_for_room(&self.db, room.id, actor).await?;

        if let Err(e) = self.notifier.clear_unread(actor, room.id).await {
            warn!(room_id = %room.id, %actor, error = %e, "clearing notifications failed");
        }
        if updated > 0 {
            self.broadcaster
                .broadcast(room.id, ServerMessage::Read { reader_id: actor }, Some(actor))
                .await;
        }
        if let Some(cache) = &self.room_cache {
            cache.invalidate(&[actor]).await;
        }
        Ok(updated)
    }

    /// Notify the other party about a stored message and drop both room
    /// list caches.
    async fn after_message(
        &self,
        room: &chat_rooms::Model,
        side: Participant,
        message: &messages::Model,
    ) {
        self.invalidate_rooms(room).await;

        let Some((project_title, sender_name)) =
            self.message_context(room, message.sender_id).await
        else {
            return;
        };
        emit_all(
            self.notifier.as_ref(),
            message_events(room, side, &project_title, &sender_name, message),
        )
        .await;
    }

    /// Project title and sender name for notification text.
    async fn message_context(
        &self,
        room: &chat_rooms::Model,
        sender_id: Uuid,
    ) -> Option<(String, String)> {
        let lookup = async {
            let project = project_db::get_project_by_id(&self.db, room.project_id).await?;
            let sender = user_db::get_user_by_id(&self.db, sender_id).await?;
            Ok::<_, CoreError>((project, sender))
        };

        match lookup.await {
            Ok((Some(project), Some(sender))) => Some((project.title, sender.full_name())),
            Ok(_) => {
                warn!(room_id = %room.id, %sender_id, "notification context missing");
                None
            }
            Err(e) => {
                warn!(room_id = %room.id, error = %e, "notification context lookup failed");
                None
            }
        }
    }

    async fn invalidate_rooms(&self, room: &chat_rooms::Model) {
        if let Some(cache) = &self.room_cache {
            cache.invalidate(&[room.client_id, room.freelancer_id]).await;
        }
    }
}

/// Events for one stored message: a chat notification to the other party,
/// plus a typed one for status changes, proposal updates and deliveries.
pub fn message_events(
    room: &chat_rooms::Model,
    sender_side: Participant,
    project_title: &str,
    sender_name: &str,
    message: &messages::Model,
) -> Vec<NotificationEvent> {
    let recipient = counterpart(room, sender_side);
    let link = EntityRef::Room {
        room_id: room.id,
        message_id: Some(message.id),
    };
    let preview: String = message.content.chars().take(PREVIEW_CHARS).collect();

    let mut events = vec![NotificationEvent::new(
        recipient,
        NotificationKind::ChatMessage,
        "New Chat Message",
        format!("{sender_name} sent a message in '{project_title}': {preview}"),
        link,
    )];

    let extra = match message.message_type {
        MessageType::StatusChange => Some((
            NotificationKind::StatusChange,
            "Project Status Changed",
            format!("The project '{project_title}' status changed: {preview}"),
        )),
        MessageType::Proposal if message.related_proposal_id.is_some() => Some((
            NotificationKind::ProposalUpdate,
            "Proposal Updated",
            format!("{sender_name} updated a proposal for '{project_title}'."),
        )),
        MessageType::Delivery => Some((
            NotificationKind::ReviewRequested,
            "Review Requested",
            format!("{sender_name} requested a review for '{project_title}'."),
        )),
        _ => None,
    };
    if let Some((kind, title, body)) = extra {
        events.push(NotificationEvent::new(recipient, kind, title, body, link));
    }

    events
}

/// Due within a day and still open.
pub fn is_due_soon(milestone: &milestones::Model, today: NaiveDate) -> bool {
    !milestone.is_completed && today >= (milestone.due_date - Duration::days(1)).date_naive()
}

fn due_soon_events(
    room: &chat_rooms::Model,
    project_title: &str,
    milestone: &milestones::Model,
) -> Vec<NotificationEvent> {
    let body = format!(
        "Milestone '{}' in '{project_title}' is due on {}.",
        milestone.title,
        milestone.due_date.format("%Y-%m-%d")
    );
    [room.client_id, room.freelancer_id]
        .into_iter()
        .map(|recipient| {
            NotificationEvent::new(
                recipient,
                NotificationKind::MilestoneDueSoon,
                "Milestone Due Soon",
                body.clone(),
                EntityRef::Room {
                    room_id: room.id,
                    message_id: None,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat_rooms::RoomStatus;

    fn room() -> chat_rooms::Model {
        let now = Utc::now();
        chat_rooms::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            is_active: true,
            project_status: RoomStatus::InProgress,
            budget: None,
            deadline: None,
            last_milestone_message_id: None,
            last_message_at: now,
            created_at: now,
        }
    }

    fn message(room: &chat_rooms::Model, kind: MessageType, content: &str) -> messages::Model {
        messages::Model {
            id: Uuid::new_v4(),
            chat_room_id: room.id,
            sender_id: room.client_id,
            seq: 1,
            content: content.to_string(),
            message_type: kind,
            is_read: false,
            is_pinned: false,
            has_attachment: false,
            related_milestone_id: None,
            related_proposal_id: None,
            created_at: Utc::now(),
        }
    }

    fn milestone(due_in_days: i64, completed: bool) -> milestones::Model {
        milestones::Model {
            id: Uuid::new_v4(),
            chat_room_id: Uuid::new_v4(),
            title: "Wireframes".into(),
            description: String::new(),
            due_date: Utc::now() + Duration::days(due_in_days),
            amount: 100.0,
            is_completed: completed,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn regular_message_notifies_only_the_other_party() {
        let r = room();
        let m = message(&r, MessageType::Regular, "hello there");

        let events = message_events(&r, Participant::Client, "Logo", "Ada", &m);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient, r.freelancer_id);
        assert_eq!(events[0].kind, NotificationKind::ChatMessage);
        assert_eq!(events[0].body, "Ada sent a message in 'Logo': hello there");
    }

    #[test]
    fn typed_messages_add_a_second_event() {
        let r = room();

        let status = message(&r, MessageType::StatusChange, "Project status updated to: REVIEW");
        let kinds: Vec<_> = message_events(&r, Participant::Client, "Logo", "Ada", &status)
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::ChatMessage, NotificationKind::StatusChange]
        );

        let delivery = message(&r, MessageType::Delivery, "final files");
        let events = message_events(&r, Participant::Freelancer, "Logo", "Bo", &delivery);
        assert_eq!(events[1].kind, NotificationKind::ReviewRequested);
        assert_eq!(events[1].recipient, r.client_id);
    }

    #[test]
    fn proposal_without_reference_is_a_plain_message() {
        let r = room();
        let m = message(&r, MessageType::Proposal, "how about this");
        assert_eq!(message_events(&r, Participant::Client, "Logo", "Ada", &m).len(), 1);
    }

    #[test]
    fn preview_is_truncated() {
        let r = room();
        let long = "x".repeat(200);
        let m = message(&r, MessageType::Regular, &long);
        let events = message_events(&r, Participant::Client, "P", "A", &m);
        assert!(events[0].body.ends_with(&"x".repeat(PREVIEW_CHARS)));
        assert!(!events[0].body.contains(&"x".repeat(PREVIEW_CHARS + 1)));
    }

    #[test]
    fn due_soon_window() {
        let today = Utc::now().date_naive();
        assert!(is_due_soon(&milestone(0, false), today));
        assert!(is_due_soon(&milestone(1, false), today));
        assert!(!is_due_soon(&milestone(5, false), today));
        assert!(!is_due_soon(&milestone(0, true), today));
    }
}
