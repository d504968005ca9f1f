// File: ticketbot-core/src/test_utils/mocks.rs
//
// In-memory stand-ins for the Postgres repositories and the Telegram client.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;
use ticketbot_common::models::{
    AdminNotification, AttendeeRow, ChatId, Event, EventFieldValue, Feedback, InputFile, MessageId,
    NewEvent, ReplyMarkup, Ticket, User, UserEvent, UserTicket,
};
use ticketbot_common::traits::api::ChatTransport;
use ticketbot_common::traits::repository_traits::{
    AdminNotificationRepository, EventRepository, FeedbackRepository, PaymentLinkRepository,
    TicketRepository, UsedTicketRepository, UserEventRepository, UserRepository,
};
use crate::Error;
use crate::repositories::Repositories;

#[derive(Default)]
struct StoreState {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    tickets: BTreeMap<i64, Ticket>,
    used: BTreeSet<i64>,
    user_events: Vec<UserEvent>,
    feedback: Vec<Feedback>,
    notifications: Vec<AdminNotification>,
    payment_link: Option<String>,
    next_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One shared in-memory database implementing every repository trait.
///
/// A single mutex guards all tables, so `take_for_buyer` is atomic the same
/// way the Postgres `DELETE .. RETURNING` is.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `Repositories` bundle where every handle points at this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            events: Arc::new(self.clone()),
            tickets: Arc::new(self.clone()),
            used_tickets: Arc::new(self.clone()),
            user_events: Arc::new(self.clone()),
            feedback: Arc::new(self.clone()),
            notifications: Arc::new(self.clone()),
            payment_link: Arc::new(self.clone()),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }

    pub async fn all_tickets(&self) -> Vec<Ticket> {
        self.state.lock().await.tickets.values().cloned().collect()
    }

    pub async fn all_user_events(&self) -> Vec<UserEvent> {
        self.state.lock().await.user_events.clone()
    }

    pub async fn all_feedback(&self) -> Vec<Feedback> {
        self.state.lock().await.feedback.clone()
    }

    pub async fn all_notifications(&self) -> Vec<AdminNotification> {
        self.state.lock().await.notifications.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.user_id) {
            return Err(Error::Platform(format!("duplicate user {}", user.user_id)));
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: i64, full_name: &str, university: &str) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&user_id) {
            Some(u) => {
                u.full_name = full_name.to_string();
                u.university = university.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create_event(&self, event: &NewEvent) -> Result<i64, Error> {
        let mut state = self.state.lock().await;
        let event_id = state.next_id();
        state.events.insert(
            event_id,
            Event {
                event_id,
                name: event.name.clone(),
                description: event.description.clone(),
                photo_file_id: event.photo_file_id.clone(),
                price: event.price,
                starts_at: event.starts_at,
                is_sale_active: event.is_sale_active,
                template_path: event.template_path.clone(),
                photo_album_link: event.photo_album_link.clone(),
            },
        );
        Ok(event_id)
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>, Error> {
        Ok(self.state.lock().await.events.get(&event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, Error> {
        Ok(self.state.lock().await.events.values().cloned().collect())
    }

    async fn list_active_events(&self, now: NaiveDateTime) -> Result<Vec<Event>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .values()
            .filter(|e| e.is_sale_active && e.starts_at > now)
            .cloned()
            .collect())
    }

    async fn update_field(&self, event_id: i64, value: &EventFieldValue) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        match state.events.get_mut(&event_id) {
            Some(e) => {
                value.apply_to(e);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        if state.events.remove(&event_id).is_none() {
            return Ok(false);
        }
        // same cascade as the schema
        let dropped: Vec<i64> = state
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .map(|t| t.ticket_id)
            .collect();
        for id in dropped {
            state.tickets.remove(&id);
            state.used.remove(&id);
        }
        state.user_events.retain(|ue| ue.event_id != event_id);
        state.feedback.retain(|f| f.event_id != event_id);
        Ok(true)
    }
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn create_ticket(&self, user_id: i64, event_id: i64, image_path: &str) -> Result<Ticket, Error> {
        let mut state = self.state.lock().await;
        let ticket_id = state.next_id();
        let ticket = Ticket {
            ticket_id,
            user_id,
            event_id,
            image_path: image_path.to_string(),
        };
        state.tickets.insert(ticket_id, ticket.clone());
        Ok(ticket)
    }

    async fn get_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>, Error> {
        Ok(self.state.lock().await.tickets.get(&ticket_id).cloned())
    }

    async fn delete_ticket(&self, ticket_id: i64) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        state.tickets.remove(&ticket_id);
        state.used.remove(&ticket_id);
        Ok(())
    }

    async fn list_user_tickets(&self, user_id: i64) -> Result<Vec<UserTicket>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| {
                state.events.get(&t.event_id).map(|e| UserTicket {
                    ticket_id: t.ticket_id,
                    event_id: t.event_id,
                    image_path: t.image_path.clone(),
                    event_name: e.name.clone(),
                })
            })
            .collect())
    }

    async fn list_attendees(&self, event_id: i64) -> Result<Vec<AttendeeRow>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .filter_map(|t| state.users.get(&t.user_id))
            .map(|u| AttendeeRow {
                full_name: u.full_name.clone(),
                university: u.university.clone(),
                phone_number: u.phone_number.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl UsedTicketRepository for InMemoryStore {
    async fn mark_used(&self, ticket_id: i64) -> Result<(), Error> {
        self.state.lock().await.used.insert(ticket_id);
        Ok(())
    }

    async fn is_used(&self, ticket_id: i64) -> Result<bool, Error> {
        Ok(self.state.lock().await.used.contains(&ticket_id))
    }
}

#[async_trait]
impl UserEventRepository for InMemoryStore {
    async fn add_user_event(&self, user_id: i64, event_id: i64) -> Result<i64, Error> {
        let mut state = self.state.lock().await;
        let user_event_id = state.next_id();
        state.user_events.push(UserEvent {
            user_event_id,
            user_id,
            event_id,
        });
        Ok(user_event_id)
    }

    async fn list_user_events(&self, user_id: i64) -> Result<Vec<Event>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .user_events
            .iter()
            .filter(|ue| ue.user_id == user_id)
            .filter_map(|ue| state.events.get(&ue.event_id).cloned())
            .collect())
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn add_feedback(&self, user_id: i64, event_id: i64, body: &str) -> Result<i64, Error> {
        let mut state = self.state.lock().await;
        let feedback_id = state.next_id();
        state.feedback.push(Feedback {
            feedback_id,
            user_id,
            event_id,
            body: body.to_string(),
        });
        Ok(feedback_id)
    }
}

#[async_trait]
impl AdminNotificationRepository for InMemoryStore {
    async fn add_notification(&self, notification: &AdminNotification) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if !state.notifications.contains(notification) {
            state.notifications.push(notification.clone());
        }
        Ok(())
    }

    async fn has_pending(&self, buyer_id: i64) -> Result<bool, Error> {
        let state = self.state.lock().await;
        Ok(state.notifications.iter().any(|n| n.buyer_id == buyer_id))
    }

    async fn take_for_buyer(&self, buyer_id: i64) -> Result<Vec<AdminNotification>, Error> {
        let mut state = self.state.lock().await;
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.notifications)
            .into_iter()
            .partition(|n| n.buyer_id == buyer_id);
        state.notifications = kept;
        Ok(taken)
    }
}

#[async_trait]
impl PaymentLinkRepository for InMemoryStore {
    async fn get_link(&self) -> Result<Option<String>, Error> {
        Ok(self.state.lock().await.payment_link.clone())
    }

    async fn set_link(&self, link: &str) -> Result<(), Error> {
        self.state.lock().await.payment_link = Some(link.to_string());
        Ok(())
    }
}

/// What the bot tried to put on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        markup: Option<ReplyMarkup>,
    },
    Image {
        chat_id: ChatId,
        message_id: MessageId,
        image: InputFile,
        caption: Option<String>,
        markup: Option<ReplyMarkup>,
    },
    Document {
        chat_id: ChatId,
        message_id: MessageId,
        document: InputFile,
        caption: Option<String>,
        markup: Option<ReplyMarkup>,
    },
}

impl Sent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Sent::Text { chat_id, .. } | Sent::Image { chat_id, .. } | Sent::Document { chat_id, .. } => *chat_id,
        }
    }

    pub fn message_id(&self) -> MessageId {
        match self {
            Sent::Text { message_id, .. }
            | Sent::Image { message_id, .. }
            | Sent::Document { message_id, .. } => *message_id,
        }
    }

    /// Message text or caption.
    pub fn text(&self) -> &str {
        match self {
            Sent::Text { text, .. } => text,
            Sent::Image { caption, .. } | Sent::Document { caption, .. } => caption.as_deref().unwrap_or(""),
        }
    }

    pub fn markup(&self) -> Option<&ReplyMarkup> {
        match self {
            Sent::Text { markup, .. } | Sent::Image { markup, .. } | Sent::Document { markup, .. } => markup.as_ref(),
        }
    }

    /// Payloads of every inline button on the message.
    pub fn button_payloads(&self) -> Vec<String> {
        match self.markup() {
            Some(ReplyMarkup::Inline(rows)) => rows
                .iter()
                .flatten()
                .map(|b| b.payload.clone())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A `ChatTransport` that records instead of sending.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<Vec<(ChatId, MessageId)>>,
    answered: Mutex<Vec<String>>,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    next_message_id: AtomicI64,
    fail_images: AtomicBool,
    fail_deletes: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `send_image` call fail, as if the platform refused the upload.
    pub fn fail_images(&self, fail: bool) {
        self.fail_images.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Registers a file that `download_file` will return.
    pub async fn put_file(&self, file_id: &str, data: Vec<u8>) {
        self.files.lock().await.insert(file_id.to_string(), data);
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|s| s.chat_id() == chat_id)
            .cloned()
            .collect()
    }

    pub async fn last_to(&self, chat_id: ChatId) -> Option<Sent> {
        self.sent_to(chat_id).await.pop()
    }

    pub async fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.deleted.lock().await.clone()
    }

    pub async fn answered(&self) -> Vec<String> {
        self.answered.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.deleted.lock().await.clear();
    }

    fn next_id(&self) -> MessageId {
        self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error> {
        let message_id = self.next_id();
        self.sent.lock().await.push(Sent::Text {
            chat_id,
            message_id,
            text: text.to_string(),
            markup,
        });
        Ok(message_id)
    }

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: InputFile,
        caption: Option<&str>,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error> {
        if self.fail_images.load(Ordering::SeqCst) {
            return Err(Error::Platform("sendPhoto failed: Bad Request".into()));
        }
        let message_id = self.next_id();
        self.sent.lock().await.push(Sent::Image {
            chat_id,
            message_id,
            image,
            caption: caption.map(str::to_string),
            markup,
        });
        Ok(message_id)
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        document: InputFile,
        caption: Option<&str>,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error> {
        let message_id = self.next_id();
        self.sent.lock().await.push(Sent::Document {
            chat_id,
            message_id,
            document,
            caption: caption.map(str::to_string),
            markup,
        });
        Ok(message_id)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), Error> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Platform("deleteMessage failed: message to delete not found".into()));
        }
        self.deleted.lock().await.push((chat_id, message_id));
        Ok(())
    }

    async fn answer_button(&self, callback_id: &str) -> Result<(), Error> {
        self.answered.lock().await.push(callback_id.to_string());
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, Error> {
        self.files
            .lock()
            .await
            .get(file_id)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("getFile failed for {}", file_id)))
    }
}
