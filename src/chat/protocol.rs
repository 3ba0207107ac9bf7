use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::messages::MessageResponse;
use crate::models::milestones::{self, CreateMilestone};

// ── Client -> Server messages ──

/// Frames the client sends over WebSocket, as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Post a regular chat message.
    Regular { content: String },
    /// Create or complete a milestone.
    Milestone(MilestoneAction),
    /// Mark everything the other party sent as read.
    MarkRead,
    Typing,
    StopTyping,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MilestoneAction {
    Create(CreateMilestone),
    Complete { milestone_id: Uuid },
}

// ── Server -> Client messages ──

/// Frames the server pushes to every connection in a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// A newly stored message.
    Regular(MessageResponse),
    /// A milestone was created or completed, with the message announcing it.
    Milestone {
        milestone: milestones::Model,
        message: MessageResponse,
    },
    /// A participant read the room.
    Read { reader_id: Uuid },
    Typing { user_id: Uuid },
    StopTyping { user_id: Uuid },
    /// A user came online or went offline in this room.
    Presence { user_id: Uuid, online: bool },
    /// Sent only to the connection whose frame failed.
    Error { kind: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_regular_frame() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "REGULAR", "payload": {"content": "hi"}}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Regular { content } if content == "hi"));
    }

    #[test]
    fn parses_milestone_actions() {
        let create: ClientMessage = serde_json::from_str(
            r#"{"type": "MILESTONE", "payload": {
                "action": "create",
                "title": "Wireframes",
                "description": "Home and search pages",
                "due_date": "2030-01-15T12:00:00Z",
                "amount": 250.0
            }}"#,
        )
        .unwrap();
        assert!(matches!(
            create,
            ClientMessage::Milestone(MilestoneAction::Create(CreateMilestone { ref title, .. })) if title == "Wireframes"
        ));

        let id = Uuid::new_v4();
        let complete: ClientMessage = serde_json::from_str(&format!(
            r#"{{"type": "MILESTONE", "payload": {{"action": "complete", "milestone_id": "{id}"}}}}"#
        ))
        .unwrap();
        assert!(matches!(
            complete,
            ClientMessage::Milestone(MilestoneAction::Complete { milestone_id }) if milestone_id == id
        ));
    }

    #[test]
    fn unit_frames_need_no_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "MARK_READ"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::MarkRead));
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "STOP_TYPING"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StopTyping));
    }

    #[test]
    fn server_frames_are_adjacently_tagged() {
        let user_id = Uuid::nil();
        let json = serde_json::to_value(ServerMessage::Presence {
            user_id,
            online: true,
        })
        .unwrap();

        assert_eq!(json["type"], "PRESENCE");
        assert_eq!(json["payload"]["online"], true);
        assert_eq!(json["payload"]["user_id"], user_id.to_string());
    }
}
