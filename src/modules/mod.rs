pub mod file_upload;
pub mod message;
pub mod user;
pub mod websocket;
