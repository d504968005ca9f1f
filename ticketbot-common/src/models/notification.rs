/// A live approval prompt: message `message_id` in admin `admin_id`'s chat
/// asks about the pending purchase of `buyer_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct AdminNotification {
    pub admin_id: i64,
    pub message_id: i64,
    pub buyer_id: i64,
}
