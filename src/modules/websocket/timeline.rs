/// Client Timeline
///
/// Reconciliation state machine cho phía client của optimistic send.
/// Client append bản provisional ngay khi gửi; timeline này reconcile
/// nó với các frame ack của server:
///
/// - `message_confirmed`: thay bản provisional bằng record đã persist,
///   giữ nguyên vị trí trong timeline
/// - `message_send_failed`: gỡ bản provisional ra khỏi timeline
/// - `receive_message`: append message của phía bên kia, dedup theo id
///
/// Mọi transition đều idempotent: ack lặp lại hoặc ack cho temp_id
/// không còn tồn tại là no-op.
use std::collections::HashMap;
use uuid::Uuid;

use crate::modules::message::schema::{MessageEntity, MessageKind};

use super::message::ServerMessage;

/// Một entry trong timeline: message kèm trạng thái pending
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub message: MessageEntity,
    /// true = bản optimistic chưa được server confirm
    pub pending: bool,
}

/// Timeline của một cuộc chat phía client
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    /// Map temp_id -> index của entry pending, để reconcile O(1)
    pending: HashMap<Uuid, usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load lịch sử từ server (initial fetch), thay toàn bộ state hiện tại.
    /// Entries pending đang chờ ack sẽ mất — caller chỉ gọi khi mở chat mới.
    pub fn load_history(&mut self, messages: Vec<MessageEntity>) {
        self.pending.clear();
        self.entries =
            messages.into_iter().map(|message| TimelineEntry { message, pending: false }).collect();
    }

    /// Append bản provisional khi user bấm gửi. Trả về `temp_id` client
    /// phải gửi kèm frame `send_message`.
    pub fn push_provisional(
        &mut self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: Option<String>,
        kind: MessageKind,
        file_url: Option<String>,
    ) -> Uuid {
        let temp_id = Uuid::now_v7();

        self.entries.push(TimelineEntry {
            message: MessageEntity {
                id: temp_id,
                sender_id,
                receiver_id,
                content,
                kind,
                file_url,
                created_at: chrono::Utc::now(),
            },
            pending: true,
        });
        self.pending.insert(temp_id, self.entries.len() - 1);

        temp_id
    }

    /// Apply một frame từ server lên timeline
    pub fn apply(&mut self, frame: &ServerMessage) {
        match frame {
            ServerMessage::ReceiveMessage { message } => {
                // Dedup theo server id (reconnect có thể replay frame)
                if self.entries.iter().any(|e| e.message.id == message.id) {
                    return;
                }
                self.entries.push(TimelineEntry { message: message.clone(), pending: false });
            }

            ServerMessage::MessageConfirmed { temp_id, message } => {
                // Thay in-place để giữ vị trí; ack không khớp là no-op
                if let Some(index) = self.pending.remove(temp_id) {
                    self.entries[index] =
                        TimelineEntry { message: message.clone(), pending: false };
                }
            }

            ServerMessage::MessageSendFailed { temp_id, .. } => {
                if let Some(index) = self.pending.remove(temp_id) {
                    self.entries.remove(index);

                    // Entries sau vị trí bị gỡ dịch trái một
                    for pending_index in self.pending.values_mut() {
                        if *pending_index > index {
                            *pending_index -= 1;
                        }
                    }
                }
            }

            // Các frame còn lại không ảnh hưởng timeline
            _ => {}
        }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Số entry đang chờ server ack
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
