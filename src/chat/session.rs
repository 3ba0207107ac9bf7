use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::authorization::authorize_room;
use crate::auth::jwt;
use crate::auth::middleware::JwtSecret;
use crate::chat::protocol::{ClientMessage, MilestoneAction, ServerMessage};
use crate::error::CoreError;
use crate::models::messages::{MessageType, PostMessageRequest};
use crate::services::ChatService;

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/chat/ws/{room_id}?token=<jwt>
///
/// Browsers can't send an Authorization header during the handshake, so the
/// token comes in the query string. The caller must be a member of the room
/// before the connection is upgraded.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<Uuid>,
    query: web::Query<WsQuery>,
    secret: web::Data<JwtSecret>,
    chat: web::Data<ChatService>,
) -> Result<HttpResponse, actix_web::Error> {
    let room_id = path.into_inner();

    let claims = jwt::validate_token(&query.token, &secret.0)
        .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;
    let user_id = claims
        .user_id()
        .map_err(actix_web::error::ErrorUnauthorized)?;

    authorize_room(chat.db(), room_id, user_id).await?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;
    let (conn_id, rx) = chat.broadcaster().join(room_id, user_id).await;
    let connections = chat.broadcaster().connection_count(room_id).await;
    debug!(%room_id, %user_id, %conn_id, connections, "websocket connected");

    actix_web::rt::spawn(handle_ws_session(
        session,
        msg_stream,
        rx,
        room_id,
        user_id,
        conn_id,
        chat.get_ref().clone(),
    ));

    Ok(response)
}

/// Pump frames both ways until either side closes, then leave the room.
async fn handle_ws_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    room_id: Uuid,
    user_id: Uuid,
    conn_id: Uuid,
    chat: ChatService,
) {
    loop {
        tokio::select! {
            Some(msg) = msg_stream.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Err(e) = handle_client_message(&text, room_id, user_id, &chat).await {
                            let frame = ServerMessage::Error {
                                kind: e.kind().to_string(),
                                message: e.public_message(),
                            };
                            if send(&mut session, &frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(Message::Ping(bytes)) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
            Some(server_msg) = rx.recv() => {
                if send(&mut session, &server_msg).await.is_err() {
                    break;
                }
            }
            else => break,
        }
    }

    chat.broadcaster().leave(room_id, conn_id).await;
    let still_online = chat.broadcaster().is_user_online(room_id, user_id).await;
    debug!(%room_id, %user_id, %conn_id, still_online, "websocket disconnected");
    let _ = session.close(None).await;
}

async fn send(session: &mut actix_ws::Session, frame: &ServerMessage) -> Result<(), ()> {
    let Ok(json) = serde_json::to_string(frame) else {
        return Ok(());
    };
    session.text(json).await.map_err(|_| ())
}

/// Apply one inbound frame. Stored messages reach this connection through
/// the broadcaster like everyone else's.
async fn handle_client_message(
    text: &str,
    room_id: Uuid,
    user_id: Uuid,
    chat: &ChatService,
) -> Result<(), CoreError> {
    let client_msg: ClientMessage = serde_json::from_str(text)
        .map_err(|e| CoreError::validation(format!("Invalid message format: {e}")))?;

    match client_msg {
        ClientMessage::Regular { content } => {
            chat.post_message(
                room_id,
                user_id,
                PostMessageRequest {
                    content,
                    message_type: MessageType::Regular,
                    related_milestone_id: None,
                    related_proposal_id: None,
                },
            )
            .await?;
        }
        ClientMessage::Milestone(MilestoneAction::Create(input)) => {
            chat.create_milestone(room_id, user_id, input).await?;
        }
        ClientMessage::Milestone(MilestoneAction::Complete { milestone_id }) => {
            chat.complete_milestone(milestone_id, user_id).await?;
        }
        ClientMessage::MarkRead => {
            chat.mark_read(room_id, user_id).await?;
        }
        ClientMessage::Typing => {
            chat.broadcaster()
                .broadcast(room_id, ServerMessage::Typing { user_id }, Some(user_id))
                .await;
        }
        ClientMessage::StopTyping => {
            chat.broadcaster()
                .broadcast(room_id, ServerMessage::StopTyping { user_id }, Some(user_id))
                .await;
        }
    }

    Ok(())
}
