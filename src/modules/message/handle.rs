use actix_web::{HttpRequest, get, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::message::{
        repository_pg::MessageRepositoryPg, schema::MessageEntity, service::MessageService,
    },
};

type MessageSvc = MessageService<MessageRepositoryPg>;

/// Initial history load khi client mở một cuộc chat
#[get("/{user1}/{user2}")]
pub async fn get_history(
    message_service: web::Data<MessageSvc>,
    path: web::Path<(Uuid, Uuid)>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let (user1, user2) = path.into_inner();

    // Caller phải là một trong hai phía của cuộc chat
    if caller_id != user1 && caller_id != user2 {
        return Err(error::Error::forbidden("You can only read your own conversations"));
    }

    let messages = message_service.history(&user1, &user2).await?;
    Ok(success::Success::ok(Some(messages)).message("Messages retrieved successfully"))
}
