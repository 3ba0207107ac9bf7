use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::CoreError;
use crate::models::attachments::UploadAttachments;
use crate::models::chat_rooms::ChangeProjectStatus;
use crate::models::messages::{MessageQuery, PostMessageRequest};
use crate::models::milestones::CreateMilestone;
use crate::services::ChatService;

/// GET /api/chat/rooms: the caller's active rooms, most recent first.
pub async fn list_rooms(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
) -> Result<HttpResponse, CoreError> {
    let rooms = chat.list_rooms(user.0.id).await?;
    Ok(HttpResponse::Ok().json(rooms))
}

/// POST /api/chat/projects/{project_id}/room: get or create a project's room.
pub async fn open_room(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let room = chat.open_room(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(room))
}

/// GET /api/chat/rooms/{id}: room page. Marks the room read for the caller.
pub async fn room_detail(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let detail = chat.room_detail(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/chat/rooms/{id}/messages?filter=all|unread|pinned
pub async fn list_messages(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
    query: web::Query<MessageQuery>,
) -> Result<HttpResponse, CoreError> {
    let messages = chat
        .list_messages(path.into_inner(), user.0.id, query.filter)
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// POST /api/chat/rooms/{id}/messages
pub async fn post_message(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
    body: web::Json<PostMessageRequest>,
) -> Result<HttpResponse, CoreError> {
    let message = chat
        .post_message(path.into_inner(), user.0.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// POST /api/chat/rooms/{id}/read
pub async fn mark_read(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let updated = chat.mark_read(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "marked_read": updated })))
}

/// POST /api/chat/rooms/{id}/attachments: file references only; bytes live
/// in external storage.
pub async fn post_attachments(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
    body: web::Json<UploadAttachments>,
) -> Result<HttpResponse, CoreError> {
    let (message, attachments) = chat
        .post_attachments(path.into_inner(), user.0.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": message,
        "attachments": attachments,
    })))
}

/// POST /api/chat/rooms/{id}/status
pub async fn change_status(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
    body: web::Json<ChangeProjectStatus>,
) -> Result<HttpResponse, CoreError> {
    let room = chat
        .change_project_status(path.into_inner(), user.0.id, body.status)
        .await?;
    Ok(HttpResponse::Ok().json(room))
}

/// POST /api/chat/rooms/{id}/deactivate
pub async fn deactivate_room(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    chat.deactivate_room(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/chat/rooms/{id}: client only.
pub async fn delete_room(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    chat.delete_room(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/chat/rooms/{id}/milestones
pub async fn list_milestones(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let milestones = chat.list_milestones(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(milestones))
}

/// POST /api/chat/rooms/{id}/milestones: client only.
pub async fn create_milestone(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
    body: web::Json<CreateMilestone>,
) -> Result<HttpResponse, CoreError> {
    let (milestone, message) = chat
        .create_milestone(path.into_inner(), user.0.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "milestone": milestone,
        "message": message,
    })))
}

/// POST /api/chat/milestones/{id}/complete: freelancer only.
pub async fn complete_milestone(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let (milestone, message) = chat
        .complete_milestone(path.into_inner(), user.0.id)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "milestone": milestone,
        "message": message,
    })))
}

/// POST /api/chat/messages/{id}/pin: toggles.
pub async fn toggle_pin(
    user: AuthenticatedUser,
    chat: web::Data<ChatService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let message = chat.toggle_pin(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(message))
}
