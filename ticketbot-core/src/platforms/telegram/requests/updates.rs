// File: ticketbot-core/src/platforms/telegram/requests/updates.rs

use serde::Deserialize;
use serde_json::json;
use ticketbot_common::models::{Incoming, IncomingKind};
use crate::platforms::telegram::client::TelegramClient;
use crate::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<Sender>,
    pub chat: Chat,
    pub text: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
    pub document: Option<Document>,
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: Sender,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// Long-polls getUpdates. `timeout_secs` is the server-side wait.
pub async fn get_updates(client: &TelegramClient, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, Error> {
    client
        .call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
}

impl Update {
    /// Normalizes the update; kinds the bot does not handle yield `None`.
    pub fn into_incoming(self) -> Option<Incoming> {
        if let Some(query) = self.callback_query {
            let payload = query.data?;
            let (chat_id, message_id) = match &query.message {
                Some(m) => (m.chat.id, Some(m.message_id)),
                None => (query.from.id, None),
            };
            return Some(Incoming {
                user_id: query.from.id,
                chat_id,
                username: query.from.username,
                message_id,
                kind: IncomingKind::ButtonPress {
                    callback_id: query.id,
                    payload,
                },
            });
        }

        let message = self.message?;
        let from = message.from?;
        let kind = if let Some(contact) = message.contact {
            IncomingKind::Contact {
                phone_number: contact.phone_number,
                contact_user_id: contact.user_id,
            }
        } else if let Some(sizes) = message.photo {
            let largest = sizes.into_iter().max_by_key(|s| u64::from(s.width) * u64::from(s.height))?;
            IncomingKind::Photo { file_id: largest.file_id }
        } else if let Some(doc) = message.document {
            IncomingKind::Document { file_id: doc.file_id }
        } else {
            IncomingKind::Text(message.text?)
        };

        Some(Incoming {
            user_id: from.id,
            chat_id: message.chat.id,
            username: from.username,
            message_id: Some(message.message_id),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Update {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_text_message() {
        let u = parse(
            r#"{"update_id":10,"message":{"message_id":5,"from":{"id":42,"is_bot":false,"first_name":"A","username":"anna"},
                "chat":{"id":42,"type":"private"},"date":1700000000,"text":"/start ticket_7"}}"#,
        );
        let incoming = u.into_incoming().unwrap();
        assert_eq!(incoming.user_id, 42);
        assert_eq!(incoming.chat_id, 42);
        assert_eq!(incoming.username.as_deref(), Some("anna"));
        assert_eq!(incoming.message_id, Some(5));
        assert_eq!(incoming.kind, IncomingKind::Text("/start ticket_7".into()));
    }

    #[test]
    fn test_photo_picks_largest_size() {
        let u = parse(
            r#"{"update_id":11,"message":{"message_id":6,"from":{"id":42},"chat":{"id":42},
                "photo":[{"file_id":"small","width":90,"height":60},
                         {"file_id":"big","width":1280,"height":853},
                         {"file_id":"mid","width":320,"height":213}]}}"#,
        );
        assert_eq!(
            u.into_incoming().unwrap().kind,
            IncomingKind::Photo { file_id: "big".into() }
        );
    }

    #[test]
    fn test_contact_message() {
        let u = parse(
            r#"{"update_id":12,"message":{"message_id":7,"from":{"id":42},"chat":{"id":42},
                "contact":{"phone_number":"+79990001122","first_name":"A","user_id":42}}}"#,
        );
        assert_eq!(
            u.into_incoming().unwrap().kind,
            IncomingKind::Contact {
                phone_number: "+79990001122".into(),
                contact_user_id: Some(42),
            }
        );
    }

    #[test]
    fn test_callback_query() {
        let u = parse(
            r#"{"update_id":13,"callback_query":{"id":"cb1","from":{"id":99,"username":"admin"},
                "message":{"message_id":70,"chat":{"id":99}},"data":"confirm_payment_42_3"}}"#,
        );
        let incoming = u.into_incoming().unwrap();
        assert_eq!(incoming.user_id, 99);
        assert_eq!(incoming.message_id, Some(70));
        assert_eq!(
            incoming.kind,
            IncomingKind::ButtonPress {
                callback_id: "cb1".into(),
                payload: "confirm_payment_42_3".into(),
            }
        );
    }

    #[test]
    fn test_unhandled_update_is_skipped() {
        let u = parse(r#"{"update_id":14,"message":{"message_id":8,"from":{"id":1},"chat":{"id":1},"sticker":{}}}"#);
        assert!(u.into_incoming().is_none());
        let u = parse(r#"{"update_id":15,"edited_message":{}}"#);
        assert!(u.into_incoming().is_none());
    }
}
