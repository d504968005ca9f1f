use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::error::Error;
use crate::models::{
    AdminNotification, AttendeeRow, Event, EventFieldValue, NewEvent, Ticket, User, UserTicket,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), Error>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error>;
    /// Name and affiliation only; the phone number is immutable.
    async fn update_profile(&self, user_id: i64, full_name: &str, university: &str) -> Result<bool, Error>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, event: &NewEvent) -> Result<i64, Error>;
    async fn get_event(&self, event_id: i64) -> Result<Option<Event>, Error>;
    async fn list_events(&self) -> Result<Vec<Event>, Error>;
    /// Events with sales switched on and a start strictly after `now`.
    async fn list_active_events(&self, now: NaiveDateTime) -> Result<Vec<Event>, Error>;
    async fn update_field(&self, event_id: i64, value: &EventFieldValue) -> Result<bool, Error>;
    async fn delete_event(&self, event_id: i64) -> Result<bool, Error>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create_ticket(&self, user_id: i64, event_id: i64, image_path: &str) -> Result<Ticket, Error>;
    async fn get_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>, Error>;
    async fn delete_ticket(&self, ticket_id: i64) -> Result<(), Error>;
    async fn list_user_tickets(&self, user_id: i64) -> Result<Vec<UserTicket>, Error>;
    /// Ticket holders of one event, in ticket order.
    async fn list_attendees(&self, event_id: i64) -> Result<Vec<AttendeeRow>, Error>;
}

#[async_trait]
pub trait UsedTicketRepository: Send + Sync {
    /// Insert-only; marking an already used ticket is a no-op.
    async fn mark_used(&self, ticket_id: i64) -> Result<(), Error>;
    async fn is_used(&self, ticket_id: i64) -> Result<bool, Error>;
}

#[async_trait]
pub trait UserEventRepository: Send + Sync {
    async fn add_user_event(&self, user_id: i64, event_id: i64) -> Result<i64, Error>;
    async fn list_user_events(&self, user_id: i64) -> Result<Vec<Event>, Error>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn add_feedback(&self, user_id: i64, event_id: i64, body: &str) -> Result<i64, Error>;
}

#[async_trait]
pub trait AdminNotificationRepository: Send + Sync {
    async fn add_notification(&self, notification: &AdminNotification) -> Result<(), Error>;
    /// Whether any admin still holds an unanswered prompt about `buyer_id`.
    async fn has_pending(&self, buyer_id: i64) -> Result<bool, Error>;
    /// Atomically removes and returns every live prompt about `buyer_id`.
    /// Two concurrent callers never both receive the same row.
    async fn take_for_buyer(&self, buyer_id: i64) -> Result<Vec<AdminNotification>, Error>;
}

#[async_trait]
pub trait PaymentLinkRepository: Send + Sync {
    async fn get_link(&self) -> Result<Option<String>, Error>;
    /// Replaces the single stored link, creating it on first use.
    async fn set_link(&self, link: &str) -> Result<(), Error>;
}
