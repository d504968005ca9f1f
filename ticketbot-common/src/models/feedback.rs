#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Feedback {
    pub feedback_id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub body: String,
}
