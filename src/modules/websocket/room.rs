/// Room Derivation
///
/// Room của một cặp user là một key ephemeral, chỉ dùng để scope fan-out,
/// không bao giờ persist. Key phải deterministic và không phụ thuộc thứ tự
/// tham số để hai phía của cuộc chat luôn join cùng một room.
use uuid::Uuid;

/// Separator giữa hai uuid trong room id. Không thể xuất hiện bên trong
/// một uuid dạng hyphenated nên không có nguy cơ collision giữa các cặp.
pub const ROOM_SEPARATOR: char = '_';

/// Room id chuẩn của một cặp user: uuid nhỏ hơn đứng trước.
///
/// Thứ tự byte của `Uuid` trùng với thứ tự lexicographic của dạng
/// hyphenated lowercase, nên so sánh trực tiếp là đủ.
pub fn room_id(user_a: &Uuid, user_b: &Uuid) -> String {
    let (first, second) = if user_a <= user_b { (user_a, user_b) } else { (user_b, user_a) };
    format!("{first}{ROOM_SEPARATOR}{second}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_is_symmetric() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(room_id(&a, &b), room_id(&b, &a));
    }

    #[test]
    fn test_room_id_orders_smaller_uuid_first() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
        let expected = format!("{a}_{b}");
        assert_eq!(room_id(&a, &b), expected);
        assert_eq!(room_id(&b, &a), expected);
    }

    #[test]
    fn test_distinct_pairs_produce_distinct_rooms() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        assert_ne!(room_id(&a, &b), room_id(&a, &c));
        assert_ne!(room_id(&a, &b), room_id(&b, &c));
    }

    #[test]
    fn test_self_room_is_valid() {
        let a = Uuid::now_v7();
        let id = room_id(&a, &a);
        assert_eq!(id, format!("{a}_{a}"));
    }

    #[test]
    fn test_separator_never_occurs_in_uuid() {
        // Dạng hyphenated chỉ gồm hex digits và '-'
        let a = Uuid::now_v7();
        assert!(!a.to_string().contains(ROOM_SEPARATOR));
    }
}
