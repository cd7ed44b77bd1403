use uuid::Uuid;

use crate::modules::message::schema::MessageKind;

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: Option<String>,
    pub kind: MessageKind,
    pub file_url: Option<String>,
}
