/// WebSocket Server Actor
///
/// Server actor chịu trách nhiệm quản lý tất cả WebSocket connections
/// và room membership. Room table là một mapping tường minh từ room key
/// (derive từ cặp user) sang set các session đang sống — không có global
/// state nào ngoài actor này.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;

/// WebSocket server quản lý tất cả client sessions và rooms
pub struct ChatServer {
    /// Map: session_id -> recipient của session actor
    /// Lưu tất cả active WebSocket connections
    sessions: HashMap<Uuid, Recipient<ServerMessage>>,

    /// Map: room_id -> set of session_ids
    /// Membership hoàn toàn ephemeral: mất hết khi disconnect, không persist
    rooms: HashMap<String, HashSet<Uuid>>,
}

impl ChatServer {
    /// Tạo WebSocket server mới với state rỗng
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), rooms: HashMap::new() }
    }

    /// Gửi message tới một session cụ thể
    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session) = self.sessions.get(session_id) {
            session.do_send(message);
        }
    }
}

impl Actor for ChatServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

/// Handler: Session mới connected
impl Handler<Connect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);

        self.sessions.insert(msg.id, msg.addr);
    }
}

/// Handler: Session disconnected
impl Handler<Disconnect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);

        // Gỡ session khỏi mọi room nó đã join
        for members in self.rooms.values_mut() {
            members.remove(&msg.id);
        }

        // Clean up empty rooms
        self.rooms.retain(|_, members| !members.is_empty());
    }
}

/// Handler: Join room
impl Handler<JoinRoom> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: JoinRoom, _: &mut Context<Self>) {
        // Idempotent: join lại room đã join là no-op (HashSet insert)
        self.rooms.entry(msg.room_id.clone()).or_default().insert(msg.session_id);

        tracing::info!(
            "Session {} joined room {} ({} sessions in room)",
            msg.session_id,
            msg.room_id,
            self.rooms.get(&msg.room_id).map_or(0, HashSet::len)
        );
    }
}

/// Handler: Broadcast message tới room
impl Handler<BroadcastToRoom> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToRoom, _: &mut Context<Self>) {
        if let Some(members) = self.rooms.get(&msg.room_id) {
            let mut sent_count = 0;

            for session_id in members {
                // Skip origin session: nó nhận ack riêng, không nhận fan-out
                if msg.skip_session_id == Some(*session_id) {
                    continue;
                }

                self.send_to_session(session_id, msg.message.clone());
                sent_count += 1;
            }

            tracing::debug!("Broadcast to room {}: sent to {} sessions", msg.room_id, sent_count);
        } else {
            tracing::debug!("Attempted to broadcast to non-existent room: {}", msg.room_id);
        }
    }
}

/// Handler: Đếm thành viên của một room
impl Handler<RoomSize> for ChatServer {
    type Result = usize;

    fn handle(&mut self, msg: RoomSize, _: &mut Context<Self>) -> Self::Result {
        self.rooms.get(&msg.room_id).map_or(0, HashSet::len)
    }
}

/// Implement Message trait cho ServerMessage để có thể send tới sessions
impl Message for ServerMessage {
    type Result = ();
}

impl Default for ChatServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::websocket::room::room_id;

    struct NullSession;

    impl Actor for NullSession {
        type Context = Context<Self>;
    }

    impl Handler<ServerMessage> for NullSession {
        type Result = ();

        fn handle(&mut self, _: ServerMessage, _: &mut Context<Self>) {}
    }

    #[actix_web::test]
    async fn test_join_is_idempotent() {
        let server = ChatServer::default().start();
        let session_id = Uuid::now_v7();
        let addr = NullSession.start();
        let room = room_id(&Uuid::now_v7(), &Uuid::now_v7());

        server.send(Connect { id: session_id, addr: addr.recipient() }).await.unwrap();
        server.send(JoinRoom { session_id, room_id: room.clone() }).await.unwrap();
        server.send(JoinRoom { session_id, room_id: room.clone() }).await.unwrap();

        assert_eq!(server.send(RoomSize { room_id: room }).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_disconnect_sweeps_all_rooms() {
        let server = ChatServer::default().start();
        let session_id = Uuid::now_v7();
        let addr = NullSession.start();

        let room_a = room_id(&Uuid::now_v7(), &Uuid::now_v7());
        let room_b = room_id(&Uuid::now_v7(), &Uuid::now_v7());

        server.send(Connect { id: session_id, addr: addr.recipient() }).await.unwrap();
        server.send(JoinRoom { session_id, room_id: room_a.clone() }).await.unwrap();
        server.send(JoinRoom { session_id, room_id: room_b.clone() }).await.unwrap();

        server.send(Disconnect { id: session_id }).await.unwrap();

        assert_eq!(server.send(RoomSize { room_id: room_a }).await.unwrap(), 0);
        assert_eq!(server.send(RoomSize { room_id: room_b }).await.unwrap(), 0);
    }
}
