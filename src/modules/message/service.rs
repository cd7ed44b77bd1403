/// Message Service
///
/// Delivery engine cho tin nhắn 1-1:
/// - Persist tin nhắn qua MessageRepository (đúng một lần cho mỗi send)
/// - Fan-out record đã persist tới room, trừ session gốc
/// - Trả record về cho caller (session actor) để ack riêng cho origin
use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::{MessageEntity, MessageKind};
use crate::modules::websocket::events::BroadcastToRoom;
use crate::modules::websocket::message::ServerMessage;
use crate::modules::websocket::room::room_id;
use crate::modules::websocket::server::ChatServer;

/// Message service với generic repository để dễ testing
#[derive(Clone)]
pub struct MessageService<M>
where
    M: MessageRepository + Send + Sync,
{
    message_repo: Arc<M>,
    ws_server: Arc<Addr<ChatServer>>,
}

impl<M> MessageService<M>
where
    M: MessageRepository + Send + Sync,
{
    pub fn with_dependencies(message_repo: Arc<M>, ws_server: Arc<Addr<ChatServer>>) -> Self {
        MessageService { message_repo, ws_server }
    }

    /// Gửi tin nhắn giữa 2 users
    ///
    /// Flow:
    /// 1. Validate payload theo kind (text cần content, attachment cần file_url)
    /// 2. Durable append qua repository — bước suspend duy nhất
    /// 3. Broadcast record đã persist tới room, skip session gốc
    ///
    /// Origin không nhận `receive_message` của chính nó: nó đã có bản
    /// optimistic và sẽ nhận `message_confirmed` qua channel riêng của session.
    /// Lỗi persist không fan-out gì cả — chỉ origin được báo.
    pub async fn send_message(
        &self,
        origin_session: Uuid,
        input: InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        validate_payload(&input)?;

        let message = self.message_repo.create(&input).await?;

        self.ws_server.do_send(BroadcastToRoom {
            room_id: room_id(&message.sender_id, &message.receiver_id),
            message: ServerMessage::ReceiveMessage { message: message.clone() },
            skip_session_id: Some(origin_session),
        });

        tracing::info!(
            "Message {} saved và broadcast tới room {}",
            message.id,
            room_id(&message.sender_id, &message.receiver_id)
        );

        Ok(message)
    }

    /// Lịch sử giữa một cặp user, tăng dần theo created_at (initial load của client)
    pub async fn history(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        self.message_repo.find_by_pair(user_a, user_b).await
    }
}

fn validate_payload(input: &InsertMessage) -> Result<(), error::SystemError> {
    match input.kind {
        MessageKind::Text => {
            if input.content.as_deref().is_none_or(|c| c.trim().is_empty()) {
                return Err(error::SystemError::bad_request("Message content is required"));
            }
        }
        MessageKind::Image | MessageKind::File | MessageKind::Video => {
            if input.file_url.as_deref().is_none_or(str::is_empty) {
                return Err(error::SystemError::bad_request(
                    "File URL is required for attachment messages",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::prelude::*;
    use std::sync::Mutex;

    use crate::modules::websocket::events::{Connect, JoinRoom};

    struct MockRepo {
        messages: Mutex<Vec<MessageEntity>>,
        fail: bool,
    }

    impl MockRepo {
        fn new(fail: bool) -> Self {
            Self { messages: Mutex::new(Vec::new()), fail }
        }

        fn len(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl MessageRepository for MockRepo {
        async fn create(
            &self,
            message: &InsertMessage,
        ) -> Result<MessageEntity, error::SystemError> {
            if self.fail {
                return Err(error::SystemError::DatabaseError("connection lost".into()));
            }
            let entity = MessageEntity {
                id: Uuid::now_v7(),
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
                content: message.content.clone(),
                kind: message.kind,
                file_url: message.file_url.clone(),
                created_at: chrono::Utc::now(),
            };
            self.messages.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn find_by_pair(
            &self,
            user_a: &Uuid,
            user_b: &Uuid,
        ) -> Result<Vec<MessageEntity>, error::SystemError> {
            let mut messages: Vec<MessageEntity> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| {
                    (m.sender_id == *user_a && m.receiver_id == *user_b)
                        || (m.sender_id == *user_b && m.receiver_id == *user_a)
                })
                .cloned()
                .collect();
            messages.sort_by_key(|m| m.created_at);
            Ok(messages)
        }
    }

    /// Session giả: ghi lại mọi ServerMessage nhận được từ server actor
    struct ProbeSession {
        received: Arc<Mutex<Vec<ServerMessage>>>,
    }

    impl Actor for ProbeSession {
        type Context = Context<Self>;
    }

    impl Handler<ServerMessage> for ProbeSession {
        type Result = ();

        fn handle(&mut self, msg: ServerMessage, _: &mut Context<Self>) {
            self.received.lock().unwrap().push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "()")]
    struct Flush;

    impl Handler<Flush> for ProbeSession {
        type Result = ();

        fn handle(&mut self, _: Flush, _: &mut Context<Self>) {}
    }

    struct Probe {
        session_id: Uuid,
        addr: Addr<ProbeSession>,
        received: Arc<Mutex<Vec<ServerMessage>>>,
    }

    async fn join_probe(server: &Addr<ChatServer>, room_id: String) -> Probe {
        let received = Arc::new(Mutex::new(Vec::new()));
        let addr = ProbeSession { received: received.clone() }.start();
        let session_id = Uuid::now_v7();
        server
            .send(Connect { id: session_id, addr: addr.clone().recipient() })
            .await
            .unwrap();
        server.send(JoinRoom { session_id, room_id }).await.unwrap();
        Probe { session_id, addr, received }
    }

    fn text_message(sender_id: Uuid, receiver_id: Uuid, content: &str) -> InsertMessage {
        InsertMessage {
            sender_id,
            receiver_id,
            content: Some(content.to_string()),
            kind: MessageKind::Text,
            file_url: None,
        }
    }

    #[actix_web::test]
    async fn test_send_persists_once_and_fans_out_to_peer_only() {
        let server = ChatServer::default().start();
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let room = room_id(&sender, &receiver);

        let origin = join_probe(&server, room.clone()).await;
        let peer = join_probe(&server, room).await;

        let repo = Arc::new(MockRepo::new(false));
        let service = MessageService::with_dependencies(repo.clone(), Arc::new(server));

        let saved = service
            .send_message(origin.session_id, text_message(sender, receiver, "hello"))
            .await
            .unwrap();

        assert_eq!(saved.content.as_deref(), Some("hello"));
        assert_eq!(repo.len(), 1);

        // Flush mailboxes: server đã xử lý broadcast trước Connect/JoinRoom kế tiếp,
        // còn probe xử lý FIFO nên Flush đảm bảo mọi fan-out đã được ghi nhận
        origin.addr.send(Flush).await.unwrap();
        peer.addr.send(Flush).await.unwrap();

        let peer_received = peer.received.lock().unwrap();
        assert_eq!(peer_received.len(), 1);
        match &peer_received[0] {
            ServerMessage::ReceiveMessage { message } => {
                assert_eq!(message.id, saved.id);
                assert_eq!(message.content.as_deref(), Some("hello"));
            }
            other => panic!("Expected ReceiveMessage, got {:?}", other),
        }

        // Origin không bao giờ nhận fan-out của chính nó
        assert!(origin.received.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_failed_append_writes_nothing_and_notifies_nobody() {
        let server = ChatServer::default().start();
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let room = room_id(&sender, &receiver);

        let origin = join_probe(&server, room.clone()).await;
        let peer = join_probe(&server, room).await;

        let repo = Arc::new(MockRepo::new(true));
        let service = MessageService::with_dependencies(repo.clone(), Arc::new(server));

        let result = service
            .send_message(origin.session_id, text_message(sender, receiver, "hello"))
            .await;

        assert!(result.is_err());
        assert_eq!(repo.len(), 0);

        origin.addr.send(Flush).await.unwrap();
        peer.addr.send(Flush).await.unwrap();
        assert!(peer.received.lock().unwrap().is_empty());
        assert!(origin.received.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_text_message_requires_content() {
        let server = ChatServer::default().start();
        let repo = Arc::new(MockRepo::new(false));
        let service = MessageService::with_dependencies(repo.clone(), Arc::new(server));

        let input = InsertMessage {
            sender_id: Uuid::now_v7(),
            receiver_id: Uuid::now_v7(),
            content: Some("   ".to_string()),
            kind: MessageKind::Text,
            file_url: None,
        };

        assert!(service.send_message(Uuid::now_v7(), input).await.is_err());
        assert_eq!(repo.len(), 0);
    }

    #[actix_web::test]
    async fn test_attachment_message_requires_file_url() {
        let server = ChatServer::default().start();
        let repo = Arc::new(MockRepo::new(false));
        let service = MessageService::with_dependencies(repo.clone(), Arc::new(server));

        let input = InsertMessage {
            sender_id: Uuid::now_v7(),
            receiver_id: Uuid::now_v7(),
            content: None,
            kind: MessageKind::Image,
            file_url: None,
        };

        assert!(service.send_message(Uuid::now_v7(), input).await.is_err());
        assert_eq!(repo.len(), 0);
    }

    #[actix_web::test]
    async fn test_history_orders_by_created_at() {
        let server = ChatServer::default().start();
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();

        let repo = Arc::new(MockRepo::new(false));
        let service = MessageService::with_dependencies(repo.clone(), Arc::new(server));

        for body in ["one", "two", "three"] {
            service
                .send_message(Uuid::now_v7(), text_message(sender, receiver, body))
                .await
                .unwrap();
        }

        let history = service.history(&receiver, &sender).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        let bodies: Vec<_> = history.iter().map(|m| m.content.as_deref().unwrap()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }
}
