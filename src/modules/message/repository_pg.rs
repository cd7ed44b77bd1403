use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        // id và created_at do Postgres cấp (DEFAULT), RETURNING trả về record hoàn chỉnh
        let message = sqlx::query_as::<_, MessageEntity>(
            "INSERT INTO messages (sender_id, receiver_id, content, kind, file_url) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(message.kind)
        .bind(&message.file_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_by_pair(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // Predicate theo LEAST/GREATEST để khớp expression index
        // messages_pair_idx, bất kể chiều gửi của từng tin nhắn
        let messages = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT * FROM messages
            WHERE LEAST(sender_id, receiver_id) = LEAST($1, $2)
              AND GREATEST(sender_id, receiver_id) = GREATEST($1, $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
