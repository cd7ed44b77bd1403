use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        schema::UserEntity,
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Tìm user theo email hoặc mobile (form login chấp nhận cả hai)
    async fn find_by_email_or_mobile(
        &self,
        identifier: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;

    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError>;

    /// Danh bạ chat: tất cả users trừ chính mình, lọc theo tên (optional)
    async fn list_except(
        &self,
        excluded_id: &Uuid,
        search: Option<&str>,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError>;
}
