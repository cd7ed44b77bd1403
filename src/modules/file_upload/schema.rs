use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::message::schema::MessageKind;

/// File metadata entity from database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
    pub uploaded_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Upload response. The upload endpoint only stores bytes and returns the
/// URL; the client sends the attachment message itself over the WebSocket
/// with this URL, so attachment sends go through the same confirm/fail
/// path as text.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub url: String,
    /// Message kind the client should use when sending this attachment
    pub kind: MessageKind,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
