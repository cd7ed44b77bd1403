/// WebSocket Session Actor
///
/// Mỗi WebSocket connection có một Session actor riêng.
/// Session actor quản lý state (auth, user_id) và gửi messages tới client
/// thông qua mpsc channel được bridge từ handler.rs.
///
/// Session là nơi duy nhất gửi `message_confirmed` / `message_send_failed`:
/// hai frame đó chỉ dành cho origin, không bao giờ đi qua room broadcast.
///
/// Async operations (DB calls) sử dụng `ctx.spawn()` + `into_actor()`.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository_pg::MessageRepositoryPg;
use crate::modules::message::schema::MessageKind;
use crate::modules::message::service::MessageService;
use crate::utils::{Claims, TypeClaims};
use crate::ENV;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::room::room_id;
use super::server::ChatServer;

/// Type alias cho MessageService với concrete repository type
pub type MessageSvc = MessageService<MessageRepositoryPg>;

/// WebSocket session cho một client
pub struct ChatSession {
    /// Unique session ID
    pub id: Uuid,

    /// User ID sau khi authenticate (None nếu chưa auth)
    pub user_id: Option<Uuid>,

    /// Address của WebSocket server actor
    pub server: Addr<ChatServer>,

    /// Channel gửi JSON messages tới client (bridge → handler.rs → WebSocket)
    pub tx: mpsc::UnboundedSender<String>,

    /// Message service để persist messages vào DB (None trong test environment)
    pub message_service: Option<actix_web::web::Data<MessageSvc>>,
}

impl ChatSession {
    /// Tạo session mới với outbound channel và message service
    pub fn new(
        server: Addr<ChatServer>,
        tx: mpsc::UnboundedSender<String>,
        message_service: actix_web::web::Data<MessageSvc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: None,
            server,
            tx,
            message_service: Some(message_service),
        }
    }

    /// Gửi ServerMessage tới client thông qua channel
    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!(
                        "Không thể gửi message tới client (session {}): {}",
                        self.id,
                        e
                    );
                }
            }
            Err(e) => {
                tracing::error!("Không thể serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    /// Gửi error message tới client
    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    /// Kiểm tra user đã authenticate chưa, trả về user_id nếu có
    fn require_auth(&self) -> Option<Uuid> {
        if self.user_id.is_none() {
            self.send_error("Bạn cần xác thực trước khi thực hiện thao tác này");
            tracing::warn!("Session {} chưa authenticate, từ chối request", self.id);
        }
        self.user_id
    }

    /// Xử lý message từ client - dispatch tới handler tương ứng
    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Auth { token } => {
                self.handle_auth(&token);
            }

            ClientMessage::JoinRoom { sender_id, receiver_id } => {
                self.handle_join_room(sender_id, receiver_id);
            }

            ClientMessage::SendMessage {
                sender_id,
                receiver_id,
                content,
                kind,
                file_url,
                temp_id,
            } => {
                self.handle_send_message(
                    sender_id,
                    receiver_id,
                    content,
                    kind,
                    file_url,
                    temp_id,
                    ctx,
                );
            }

            ClientMessage::Ping => {
                // Gửi pong response về client
                self.send_to_client(&ServerMessage::Pong);
            }
        }
    }

    /// Xử lý authentication - verify JWT token và liên kết user với session
    fn handle_auth(&mut self, token: &str) {
        // Kiểm tra đã auth chưa (tránh auth lại)
        if self.user_id.is_some() {
            self.send_error("Session đã được xác thực");
            return;
        }

        // Decode và verify JWT token
        let claims = match Claims::decode(token, ENV.jwt_secret.as_ref()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT verification thất bại (session {}): {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Token không hợp lệ hoặc đã hết hạn".to_string(),
                });
                return;
            }
        };

        // Kiểm tra token type phải là AccessToken
        if claims._type.as_ref() != Some(&TypeClaims::AccessToken) {
            self.send_to_client(&ServerMessage::AuthFailed {
                reason: "Chỉ chấp nhận access token".to_string(),
            });
            return;
        }

        let user_id = claims.sub;

        // Cập nhật state session
        self.user_id = Some(user_id);

        // Gửi success response về client
        self.send_to_client(&ServerMessage::AuthSuccess { user_id });

        tracing::info!("User {} đã authenticate thành công trên session {}", user_id, self.id);
    }

    /// Xử lý join room - sender phải chính là user đã authenticate
    fn handle_join_room(&self, sender_id: Uuid, receiver_id: Uuid) {
        let Some(user_id) = self.require_auth() else {
            return;
        };

        if sender_id != user_id {
            self.send_error("Bạn chỉ có thể join room của chính mình");
            tracing::warn!(
                "Session {} (user {}) cố join room của user khác {}",
                self.id,
                user_id,
                sender_id
            );
            return;
        }

        let room = room_id(&sender_id, &receiver_id);
        self.server.do_send(JoinRoom { session_id: self.id, room_id: room.clone() });
        tracing::debug!("User {} joined room {}", user_id, room);
    }

    /// Xử lý gửi tin nhắn - lưu vào DB rồi ack riêng cho client này
    ///
    /// Fan-out tới phía bên kia do MessageService đảm nhiệm (skip session này);
    /// ở đây chỉ gửi `message_confirmed` / `message_send_failed` kèm `temp_id`
    /// để client đối chiếu với bản optimistic.
    #[allow(clippy::too_many_arguments)]
    fn handle_send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: Option<String>,
        kind: MessageKind,
        file_url: Option<String>,
        temp_id: Uuid,
        ctx: &mut Context<Self>,
    ) {
        let Some(user_id) = self.require_auth() else {
            return;
        };

        // senderId trong payload phải trùng với user đã authenticate
        if sender_id != user_id {
            self.send_to_client(&ServerMessage::MessageSendFailed {
                temp_id,
                error: "Sender không khớp với user đã xác thực".to_string(),
            });
            tracing::warn!(
                "Session {} (user {}) cố gửi message với senderId giả {}",
                self.id,
                user_id,
                sender_id
            );
            return;
        }

        tracing::debug!("User {} gửi message tới user {}", user_id, receiver_id);

        // Kiểm tra message service khả dụng
        let Some(service) = self.message_service.clone() else {
            self.send_to_client(&ServerMessage::MessageSendFailed {
                temp_id,
                error: "Message service không khả dụng".to_string(),
            });
            return;
        };

        // Clone các dependencies cần thiết cho async block
        let tx = self.tx.clone();
        let session_id = self.id;

        let input = InsertMessage { sender_id, receiver_id, content, kind, file_url };

        // Spawn async future trong actor context để gọi DB
        ctx.spawn(
            async move {
                // Persist + fan-out; session gốc bị skip nên không thấy fan-out
                let reply = match service.send_message(session_id, input).await {
                    Ok(message) => ServerMessage::MessageConfirmed { temp_id, message },
                    Err(e) => {
                        tracing::error!(
                            "Lỗi lưu message (session {}, temp_id {}): {}",
                            session_id,
                            temp_id,
                            e
                        );
                        ServerMessage::MessageSendFailed {
                            temp_id,
                            error: "Không thể gửi tin nhắn. Vui lòng thử lại.".to_string(),
                        }
                    }
                };

                if let Ok(json) = serde_json::to_string(&reply) {
                    let _ = tx.send(json);
                }
            }
            .into_actor(self),
        );
    }
}

impl Actor for ChatSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);

        // Notify server về connection mới
        self.server.do_send(Connect { id: self.id, addr: ctx.address().recipient() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);

        // Notify server về disconnect
        self.server.do_send(Disconnect { id: self.id });
    }
}

/// Lệnh dừng session actor, gửi từ handler.rs khi socket loop kết thúc.
/// Server giữ một Recipient strong tới session nên actor không tự stop
/// khi Addr phía handler bị drop; phải stop tường minh để `stopped`
/// chạy và Disconnect sweep dọn membership.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

impl Handler<Shutdown> for ChatSession {
    type Result = ();

    fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}

/// Implement Message trait cho ClientMessage để có thể send qua actors
impl Message for ClientMessage {
    type Result = ();
}

/// Handler: Nhận ClientMessage từ handler.rs
impl Handler<ClientMessage> for ChatSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(msg, ctx);
    }
}

/// Handler: Nhận ServerMessage từ server actor → serialize → gửi tới client qua channel
impl Handler<ServerMessage> for ChatSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}
