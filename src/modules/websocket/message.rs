/// WebSocket Wire Protocol
///
/// Module này định nghĩa các message types được trao đổi giữa client và server
/// thông qua WebSocket connection: một closed set các tagged variants với
/// required fields rõ ràng, validate ngay tại boundary khi parse.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::message::schema::{MessageEntity, MessageKind};

/// Messages được gửi từ client đến server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Xác thực WebSocket connection với JWT access token
    Auth { token: String },

    /// Tham gia room của cặp (sender, receiver) để nhận real-time updates
    #[serde(rename_all = "camelCase")]
    JoinRoom { sender_id: Uuid, receiver_id: Uuid },

    /// Gửi tin nhắn. `temp_id` do client tự sinh, server trả nguyên vẹn
    /// trong message_confirmed / message_send_failed để client đối chiếu
    /// với bản optimistic của nó.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        sender_id: Uuid,
        receiver_id: Uuid,
        #[serde(default)]
        content: Option<String>,
        kind: MessageKind,
        #[serde(default)]
        file_url: Option<String>,
        temp_id: Uuid,
    },

    /// Ping để giữ connection alive
    Ping,
}

/// Messages được gửi từ server đến client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Xác thực thành công
    #[serde(rename_all = "camelCase")]
    AuthSuccess { user_id: Uuid },

    /// Xác thực thất bại
    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    /// Tin nhắn mới trong room — gửi cho mọi thành viên trừ origin
    ReceiveMessage { message: MessageEntity },

    /// Ack cho riêng origin: bản optimistic `temp_id` đã được persist
    #[serde(rename_all = "camelCase")]
    MessageConfirmed { temp_id: Uuid, message: MessageEntity },

    /// Báo cho riêng origin: persist thất bại, bản optimistic phải bị gỡ
    #[serde(rename_all = "camelCase")]
    MessageSendFailed { temp_id: Uuid, error: String },

    /// Pong response cho Ping
    Pong,

    /// Lỗi xảy ra
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::message::schema::MessageKind;
    use uuid::Uuid;

    fn entity(sender: Uuid, receiver: Uuid, content: &str) -> MessageEntity {
        MessageEntity {
            id: Uuid::now_v7(),
            sender_id: sender,
            receiver_id: receiver,
            content: Some(content.to_string()),
            kind: MessageKind::Text,
            file_url: None,
            created_at: chrono::Utc::now(),
        }
    }

    // === ClientMessage deserialization ===

    #[test]
    fn test_client_auth_deserialize() {
        let json = r#"{"type":"auth","token":"my-jwt-token"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "my-jwt-token"));
    }

    #[test]
    fn test_client_join_room_deserialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"join_room","senderId":"{}","receiverId":"{}"}}"#,
            sender, receiver
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::JoinRoom { sender_id, receiver_id } => {
                assert_eq!(sender_id, sender);
                assert_eq!(receiver_id, receiver);
            }
            _ => panic!("Expected JoinRoom variant"),
        }
    }

    #[test]
    fn test_client_send_message_deserialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let temp = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"send_message","senderId":"{}","receiverId":"{}","content":"Xin chào!","kind":"text","tempId":"{}"}}"#,
            sender, receiver, temp
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::SendMessage { sender_id, receiver_id, content, kind, file_url, temp_id } => {
                assert_eq!(sender_id, sender);
                assert_eq!(receiver_id, receiver);
                assert_eq!(content.as_deref(), Some("Xin chào!"));
                assert_eq!(kind, MessageKind::Text);
                assert!(file_url.is_none());
                assert_eq!(temp_id, temp);
            }
            _ => panic!("Expected SendMessage variant"),
        }
    }

    #[test]
    fn test_client_send_attachment_deserialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let temp = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"send_message","senderId":"{}","receiverId":"{}","kind":"image","fileUrl":"/uploads/photo.png","tempId":"{}"}}"#,
            sender, receiver, temp
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::SendMessage { content, kind, file_url, .. } => {
                assert!(content.is_none());
                assert_eq!(kind, MessageKind::Image);
                assert_eq!(file_url.as_deref(), Some("/uploads/photo.png"));
            }
            _ => panic!("Expected SendMessage variant"),
        }
    }

    #[test]
    fn test_client_ping_deserialize() {
        let json = r#"{"type":"ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_invalid_type_returns_error() {
        let json = r#"{"type":"unknown_type"}"#;
        let result = serde_json::from_str::<ClientMessage>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_returns_error() {
        // send_message thiếu tempId
        let json = format!(
            r#"{{"type":"send_message","senderId":"{}","receiverId":"{}","content":"hi","kind":"text"}}"#,
            Uuid::now_v7(),
            Uuid::now_v7()
        );
        let result = serde_json::from_str::<ClientMessage>(&json);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_kind_returns_error() {
        let json = format!(
            r#"{{"type":"send_message","senderId":"{}","receiverId":"{}","kind":"sticker","tempId":"{}"}}"#,
            Uuid::now_v7(),
            Uuid::now_v7(),
            Uuid::now_v7()
        );
        let result = serde_json::from_str::<ClientMessage>(&json);
        assert!(result.is_err());
    }

    // === ServerMessage serialization ===

    #[test]
    fn test_server_receive_message_serialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let msg = ServerMessage::ReceiveMessage { message: entity(sender, receiver, "Hello") };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"receive_message\""));
        assert!(json.contains("\"content\":\"Hello\""));
        assert!(json.contains(&format!("\"senderId\":\"{}\"", sender)));
    }

    #[test]
    fn test_server_message_confirmed_serialize() {
        let temp = Uuid::now_v7();
        let msg = ServerMessage::MessageConfirmed {
            temp_id: temp,
            message: entity(Uuid::now_v7(), Uuid::now_v7(), "Hello"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"message_confirmed\""));
        assert!(json.contains(&format!("\"tempId\":\"{}\"", temp)));
    }

    #[test]
    fn test_server_message_send_failed_serialize() {
        let temp = Uuid::now_v7();
        let msg = ServerMessage::MessageSendFailed {
            temp_id: temp,
            error: "Database Error".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"message_send_failed\""));
        assert!(json.contains(&format!("\"tempId\":\"{}\"", temp)));
        assert!(json.contains("Database Error"));
    }

    #[test]
    fn test_server_auth_failed_serialize() {
        let msg = ServerMessage::AuthFailed { reason: "Token hết hạn".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"auth_failed\""));
        assert!(json.contains("Token hết hạn"));
    }

    #[test]
    fn test_server_pong_serialize() {
        let msg = ServerMessage::Pong;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    // === Roundtrip ===

    #[test]
    fn test_client_message_roundtrip() {
        let original = ClientMessage::SendMessage {
            sender_id: Uuid::now_v7(),
            receiver_id: Uuid::now_v7(),
            content: Some("Test message 🇻🇳".to_string()),
            kind: MessageKind::Text,
            file_url: None,
            temp_id: Uuid::now_v7(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ClientMessage = serde_json::from_str(&json).unwrap();

        match (original, deserialized) {
            (
                ClientMessage::SendMessage { temp_id: a, content: ca, .. },
                ClientMessage::SendMessage { temp_id: b, content: cb, .. },
            ) => {
                assert_eq!(a, b);
                assert_eq!(ca, cb);
            }
            _ => panic!("Roundtrip failed"),
        }
    }

    #[test]
    fn test_server_message_roundtrip() {
        let original = ServerMessage::MessageConfirmed {
            temp_id: Uuid::now_v7(),
            message: entity(Uuid::now_v7(), Uuid::now_v7(), "roundtrip"),
        };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ServerMessage = serde_json::from_str(&json).unwrap();

        match (original, deserialized) {
            (
                ServerMessage::MessageConfirmed { temp_id: a, message: ma },
                ServerMessage::MessageConfirmed { temp_id: b, message: mb },
            ) => {
                assert_eq!(a, b);
                assert_eq!(ma.id, mb.id);
                assert_eq!(ma.content, mb.content);
            }
            _ => panic!("Roundtrip failed"),
        }
    }
}
