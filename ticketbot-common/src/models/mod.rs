// File: ticketbot-common/src/models/mod.rs
pub mod chat;
pub mod event;
pub mod feedback;
pub mod notification;
pub mod ticket;
pub mod user;

pub use chat::{ChatId, Incoming, IncomingKind, InlineButton, InputFile, KeyboardButton, MessageId, ReplyMarkup};
pub use event::{Event, EventField, EventFieldValue, NewEvent, EVENT_DATE_FORMAT};
pub use feedback::Feedback;
pub use notification::AdminNotification;
pub use ticket::{AttendeeRow, Ticket, UserEvent, UserTicket};
pub use user::User;
