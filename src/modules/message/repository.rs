use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{model::InsertMessage, schema::MessageEntity},
};

/// Persistence gateway cho tin nhắn: durable append + range query theo cặp user.
#[async_trait::async_trait]
pub trait MessageRepository {
    /// Durable append. Server cấp id + created_at, trả về record đã persist.
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError>;

    /// Toàn bộ lịch sử giữa một cặp user (không phân biệt chiều),
    /// sắp xếp tăng dần theo created_at.
    async fn find_by_pair(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;
}
