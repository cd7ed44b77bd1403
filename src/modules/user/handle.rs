use actix_web::{
    HttpRequest,
    cookie::{Cookie, time},
    get, patch, post, web,
};

use crate::modules::user::model::SignUpResponse;
use crate::modules::user::{model, service::UserService};
use crate::{
    api::{error, success},
    utils::{ValidatedJson, ValidatedQuery},
};
use crate::{ENV, middlewares::get_claims};

#[get("")]
pub async fn get_directory(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<model::DirectoryQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<model::UserResponse>>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let users = user_service.directory(caller_id, query.0.search).await?;
    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}

#[get("/me")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[patch("/profile")]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    profile: ValidatedJson<model::UpdateProfileModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.update_profile(id, profile.0).await?;
    Ok(success::Success::ok(Some(user)).message("Profile updated successfully"))
}

#[post("/signup")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<SignUpResponse>, error::Error> {
    let user_id = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(SignUpResponse { id: user_id })).message("Signup successful"))
}

#[post("/signin")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let (access_token, refresh_token) = user_service.sign_in(user_data.0).await?;
    let response = model::SignInResponse { access_token };
    let refresh_cookie = Cookie::build("refresh_token", refresh_token)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(ENV.refresh_token_expiration as i64))
        .finish();

    Ok(success::Success::ok(Some(response))
        .message("Signin successful")
        .cookies(vec![refresh_cookie]))
}

#[get("/signout")]
pub async fn sign_out(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    user_service.sign_out(refresh_token).await?;
    let refresh_cookie = Cookie::build("refresh_token", "")
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .finish();

    Ok(success::Success::no_content().cookies(vec![refresh_cookie]))
}

#[post("/refresh")]
pub async fn refresh(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    let (access_token, refresh_token) = user_service.refresh(refresh_token).await?;
    let response = model::SignInResponse { access_token };
    let refresh_cookie = Cookie::build("refresh_token", refresh_token)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(ENV.refresh_token_expiration as i64))
        .finish();
    Ok(success::Success::ok(Some(response))
        .message("Refresh successful")
        .cookies(vec![refresh_cookie]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::configs::RedisCache;
    use crate::modules::user::model::{InsertUser, UpdateUser};
    use crate::modules::user::repository::UserRepository;
    use crate::modules::user::schema::UserEntity;

    struct EmptyRepo;

    #[async_trait::async_trait]
    impl UserRepository for EmptyRepo {
        async fn find_by_id(&self, _: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(None)
        }

        async fn find_by_email_or_mobile(
            &self,
            _: &str,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(None)
        }

        async fn create(&self, _: &InsertUser) -> Result<Uuid, error::SystemError> {
            Ok(Uuid::now_v7())
        }

        async fn update(
            &self,
            _: &Uuid,
            _: &UpdateUser,
        ) -> Result<UserEntity, error::SystemError> {
            Err(error::SystemError::not_found("User not found"))
        }

        async fn list_except(
            &self,
            _: &Uuid,
            _: Option<&str>,
            _: i32,
        ) -> Result<Vec<UserEntity>, error::SystemError> {
            Ok(Vec::new())
        }
    }

    fn ensure_test_env() {
        if std::env::var("SECRET_KEY").is_err() {
            std::env::set_var("SECRET_KEY", "test-secret");
        }
        if std::env::var("DATABASE_URL").is_err() {
            std::env::set_var("DATABASE_URL", "postgres://localhost/pairchat_test");
        }
        if std::env::var("REDIS_URL").is_err() {
            std::env::set_var("REDIS_URL", "redis://localhost:6379");
        }
    }

    // Client gọi GET /api/users (không có trailing slash); route phải
    // resolve được. Không có claims trong extensions nên handler trả
    // 401 — vẫn chứng minh path đã match (404 nếu không).
    #[actix_web::test]
    async fn test_directory_route_resolves_without_trailing_slash() {
        use actix_web::{App, test, web};

        ensure_test_env();
        let cache = RedisCache::new().await.unwrap();
        let user_service =
            crate::modules::user::service::UserService::with_dependencies(
                Arc::new(EmptyRepo),
                Arc::new(cache),
            );

        let app = test::init_service(
            App::new().app_data(web::Data::new(user_service)).service(
                web::scope("/api")
                    .service(web::scope("/users").service(get_directory)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
