use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
    Video,
}

/// Một tin nhắn đã được persist. Immutable sau khi ghi:
/// không có update/delete trong hệ thống này.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntity {
    /// ID do persistence layer cấp khi insert
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    /// Text payload; None đối với tin nhắn attachment thuần
    pub content: Option<String>,
    pub kind: MessageKind,
    /// URL attachment, bắt buộc khi kind != text
    pub file_url: Option<String>,
    /// Timestamp do persistence layer cấp, quyết định thứ tự hiển thị khi reload
    pub created_at: chrono::DateTime<chrono::Utc>,
}
