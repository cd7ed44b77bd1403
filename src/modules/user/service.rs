use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::configs::RedisCache;

use crate::modules::user::model::{
    InsertUser, SignInModel, SignUpModel, UpdateProfileModel, UpdateUser, UserResponse,
};
use crate::modules::user::repository::UserRepository;
use crate::utils::{Claims, TypeClaims, hash_password, verify_password};

const DIRECTORY_LIMIT: i32 = 100;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{}", id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            info!("User {} found in cache", id);
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(&id).await?;
        if let Some(entity) = user_entity {
            let response = UserResponse::from(entity);
            self.cache.set(&key, &response, 3600).await?;
            info!("User {} cached", id);
            Ok(response)
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    /// Danh bạ cho màn hình chọn người chat: mọi user trừ chính caller
    pub async fn directory(
        &self,
        caller_id: Uuid,
        search: Option<String>,
    ) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.list_except(&caller_id, search.as_deref(), DIRECTORY_LIMIT).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        profile: UpdateProfileModel,
    ) -> Result<UserResponse, error::SystemError> {
        if profile.name.is_none()
            && profile.email.is_none()
            && profile.mobile.is_none()
            && profile.password.is_none()
        {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let hash_password = match &profile.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let update_user = UpdateUser {
            name: profile.name,
            email: profile.email,
            mobile: profile.mobile,
            hash_password,
        };

        let updated = self.repo.update(&id, &update_user).await?;

        let key = format!("user:{}", id);
        self.cache.delete(&key).await?;
        Ok(UserResponse::from(updated))
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<Uuid, error::SystemError> {
        // Cần ít nhất một trong email/mobile để đăng nhập về sau
        if user.email.is_none() && user.mobile.is_none() {
            return Err(error::SystemError::bad_request("Email or mobile is required"));
        }

        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            name: user.name,
            email: user.email,
            mobile: user.mobile,
            hash_password: Some(hash_password),
        };

        let user_id = self.repo.create(&new_user).await?;
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email_or_mobile(&user.email_or_mobile)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid credentials"))?;

        // Tài khoản liên kết Google có thể chưa có mật khẩu local
        let hash = user_entity
            .hash_password
            .as_deref()
            .ok_or_else(|| error::SystemError::unauthorized("Invalid credentials"))?;

        let valid = verify_password(hash, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid credentials"));
        }

        self.issue_tokens(&user_entity.id).await
    }

    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let claims = self.verify_refresh_token(refresh_token).await?;

        // Rotation: thu hồi jti cũ trước khi phát cặp token mới
        if let Some(jti) = claims.jti {
            self.cache.delete(&format!("refresh_token:{jti}")).await?;
        }

        self.issue_tokens(&claims.sub).await
    }

    pub async fn sign_out(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(), error::SystemError> {
        let Ok(claims) = self.verify_refresh_token(refresh_token).await else {
            // Token đã hết hạn hoặc không hợp lệ thì không còn gì để thu hồi
            return Ok(());
        };

        if let Some(jti) = claims.jti {
            self.cache.delete(&format!("refresh_token:{jti}")).await?;
        }
        Ok(())
    }

    async fn issue_tokens(&self, user_id: &Uuid) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::new(user_id, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::now_v7();

        let refresh_token = Claims::new(user_id, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let refresh_key = format!("refresh_token:{jti}");
        self.cache.set(&refresh_key, user_id, ENV.refresh_token_expiration as usize).await?;

        Ok((access_token, refresh_token))
    }

    async fn verify_refresh_token(
        &self,
        refresh_token: Option<String>,
    ) -> Result<Claims, error::SystemError> {
        let token = refresh_token
            .ok_or_else(|| error::SystemError::unauthorized("Refresh token missing"))?;

        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        if claims._type != Some(TypeClaims::RefreshToken) {
            return Err(error::SystemError::unauthorized("Token Invalid or Expired"));
        }

        let jti = claims
            .jti
            .ok_or_else(|| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        // jti phải còn trong Redis (chưa bị revoke / rotate)
        let stored: Option<Uuid> = self.cache.get(&format!("refresh_token:{jti}")).await?;
        match stored {
            Some(user_id) if user_id == claims.sub => Ok(claims),
            _ => Err(error::SystemError::unauthorized("Token Invalid or Expired")),
        }
    }
}
