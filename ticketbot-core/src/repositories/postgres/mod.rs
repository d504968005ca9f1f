// src/repositories/postgres/mod.rs

pub mod user;
pub mod event;
pub mod ticket;
pub mod used_ticket;
pub mod user_event;
pub mod feedback;
pub mod admin_notification;
pub mod payment_link;
pub mod dialogue;

pub use user::{PostgresUserRepository, UserRepository};
pub use event::{PostgresEventRepository, EventRepository};
pub use ticket::{PostgresTicketRepository, TicketRepository};
pub use used_ticket::{PostgresUsedTicketRepository, UsedTicketRepository};
pub use user_event::{PostgresUserEventRepository, UserEventRepository};
pub use feedback::{PostgresFeedbackRepository, FeedbackRepository};
pub use admin_notification::{PostgresAdminNotificationRepository, AdminNotificationRepository};
pub use payment_link::{PostgresPaymentLinkRepository, PaymentLinkRepository};
pub use dialogue::{PostgresDialogueRepository, DialogueRepository};
