use std::path::PathBuf;

/// Platform chat identifier. For private chats this equals the user id.
pub type ChatId = i64;

/// Platform message identifier, stable enough to delete the message later.
pub type MessageId = i64;

/// A file to send: an already-uploaded platform reference, a file on disk,
/// or raw bytes produced in memory.
#[derive(Debug, Clone, PartialEq)]
pub enum InputFile {
    FileId(String),
    Path(PathBuf),
    Bytes { file_name: String, data: Vec<u8> },
}

/// A button that sends `payload` back as a button press.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineButton {
    pub label: String,
    pub payload: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// A reply-keyboard button. `request_contact` turns it into a contact-share button.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardButton {
    pub text: String,
    pub request_contact: bool,
}

impl KeyboardButton {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: false,
        }
    }

    pub fn contact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyMarkup {
    /// Buttons attached to the message itself, one inner vec per row.
    Inline(Vec<Vec<InlineButton>>),
    /// A persistent keyboard replacing the user's text input.
    Keyboard {
        rows: Vec<Vec<KeyboardButton>>,
        one_time: bool,
    },
    RemoveKeyboard,
}

impl ReplyMarkup {
    /// One button per row.
    pub fn inline_column(buttons: Vec<InlineButton>) -> Self {
        ReplyMarkup::Inline(buttons.into_iter().map(|b| vec![b]).collect())
    }

    /// `per_row` buttons per row.
    pub fn inline_grid(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut rows = Vec::new();
        let mut current = Vec::with_capacity(per_row);
        for b in buttons {
            current.push(b);
            if current.len() == per_row {
                rows.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }
        ReplyMarkup::Inline(rows)
    }
}

/// A normalized inbound update.
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub user_id: i64,
    pub chat_id: ChatId,
    pub username: Option<String>,
    /// The message carrying the update; for button presses, the message the button belongs to.
    pub message_id: Option<MessageId>,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncomingKind {
    Text(String),
    /// Largest available size of the photo.
    Photo { file_id: String },
    Document { file_id: String },
    /// A shared contact. `contact_user_id` is set when the contact belongs to a platform user.
    Contact {
        phone_number: String,
        contact_user_id: Option<i64>,
    },
    ButtonPress { callback_id: String, payload: String },
}
