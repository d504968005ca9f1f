use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    /// Doubles as the redemption token embedded in the ticket's code.
    pub ticket_id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub image_path: String,
}

/// A ticket joined with the name of its event, for the "My tickets" view.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserTicket {
    pub ticket_id: i64,
    pub event_id: i64,
    pub image_path: String,
    pub event_name: String,
}

/// Records that a purchase for an event was approved.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserEvent {
    pub user_event_id: i64,
    pub user_id: i64,
    pub event_id: i64,
}

/// One row of the guest-list export.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AttendeeRow {
    pub full_name: String,
    pub university: String,
    pub phone_number: String,
}
