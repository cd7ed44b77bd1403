use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserEntity;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 10, message = "Mobile number must be at least 10 digits long"))]
    pub mobile: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    /// Email hoặc số điện thoại, form login chấp nhận cả hai
    #[validate(length(min = 1, message = "Email or mobile cannot be empty"))]
    pub email_or_mobile: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileModel {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 10, message = "Mobile number must be at least 10 digits long"))]
    pub mobile: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct DirectoryQuery {
    #[validate(length(min = 1, message = "Search query cannot be empty"))]
    pub search: Option<String>,
}

pub struct InsertUser {
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub hash_password: Option<String>,
}

pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub hash_password: Option<String>,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: uuid::Uuid,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            mobile: entity.mobile,
        }
    }
}
