/// WebSocket Actor Events
///
/// Module này định nghĩa các messages được trao đổi giữa các actors
/// trong WebSocket system (giữa Session actors và Server actor).
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;

/// Event: Session mới connected đến WebSocket server
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// Unique session ID
    pub id: Uuid,
    /// Recipient của session actor để server có thể gửi ServerMessage
    pub addr: Recipient<ServerMessage>,
}

/// Event: Session disconnected khỏi WebSocket server
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    /// Session ID cần disconnect
    pub id: Uuid,
}

/// Event: Session tham gia vào một room (đã được derive từ cặp user)
#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinRoom {
    /// Session ID muốn join room
    pub session_id: Uuid,
    /// Canonical room ID của cặp user
    pub room_id: String,
}

/// Event: Broadcast message tới tất cả sessions trong room
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToRoom {
    /// Room ID cần broadcast
    pub room_id: String,
    /// Message cần broadcast
    pub message: ServerMessage,
    /// Optional: Không gửi đến session này (origin đã có bản optimistic)
    pub skip_session_id: Option<Uuid>,
}

/// Event: Đếm số session trong một room (dùng cho logging / tests)
#[derive(Message)]
#[rtype(result = "usize")]
pub struct RoomSize {
    pub room_id: String,
}
