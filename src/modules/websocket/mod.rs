/// WebSocket Module
///
/// Module này cung cấp real-time communication capability cho chat application
/// thông qua WebSocket protocol. Nó bao gồm:
///
/// - Wire protocol (ClientMessage & ServerMessage)
/// - Room derivation (canonical room id cho một cặp user)
/// - Chat Server actor (quản lý connections và room membership)
/// - Chat Session actor (xử lý từng connection, ack cho origin)
/// - HTTP handler (upgrade HTTP thành WebSocket)
/// - Timeline (reconciliation state machine phía client)
pub mod events;
pub mod handler;
pub mod message;
pub mod room;
pub mod server;
pub mod session;
pub mod timeline;
