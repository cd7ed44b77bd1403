use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        repository::UserRepository,
        schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email_or_mobile(
        &self,
        identifier: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE lower(email) = lower($1) OR mobile = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO users (id, name, email, mobile, hash_password) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(&user.hash_password)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        UPDATE users
        SET
            name          = COALESCE($2, name),
            email         = COALESCE($3, email),
            mobile        = COALESCE($4, mobile),
            hash_password = COALESCE($5, hash_password),
            updated_at    = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(&user.hash_password)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(user)
    }

    async fn list_except(
        &self,
        excluded_id: &Uuid,
        search: Option<&str>,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = if let Some(search) = search {
            let search_pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            sqlx::query_as::<_, UserEntity>(
                r#"
                SELECT * FROM users
                WHERE id <> $1 AND lower(name) LIKE lower($2)
                ORDER BY name
                LIMIT $3
                "#,
            )
            .bind(excluded_id)
            .bind(&search_pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, UserEntity>(
                "SELECT * FROM users WHERE id <> $1 ORDER BY name LIMIT $2",
            )
            .bind(excluded_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(users)
    }
}
