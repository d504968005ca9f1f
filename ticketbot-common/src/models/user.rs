use serde::{Deserialize, Serialize};

/// A registered attendee. `user_id` is the messaging platform's user identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub full_name: String,
    pub university: String,
    /// Collected once from a contact share; never updated afterwards.
    pub phone_number: String,
}
