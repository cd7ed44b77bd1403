use sqlx::prelude::FromRow;
use uuid::Uuid;

#[allow(unused)]
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    /// None đối với tài khoản liên kết (Google) chưa đặt mật khẩu local
    pub hash_password: Option<String>,
    pub google_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
