// File: ticketbot-core/src/platforms/telegram/requests/messages.rs

use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};
use ticketbot_common::models::{ChatId, InputFile, MessageId, ReplyMarkup};
use crate::platforms::telegram::client::TelegramClient;
use crate::platforms::telegram::requests::updates::Message;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Document,
}

impl MediaKind {
    fn method(self) -> &'static str {
        match self {
            MediaKind::Photo => "sendPhoto",
            MediaKind::Document => "sendDocument",
        }
    }

    fn field(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Document => "document",
        }
    }
}

/// Bot API JSON for a reply markup.
pub fn markup_json(markup: &ReplyMarkup) -> Value {
    match markup {
        ReplyMarkup::Inline(rows) => {
            let rows: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({ "text": b.label, "callback_data": b.payload }))
                        .collect()
                })
                .collect();
            json!({ "inline_keyboard": rows })
        }
        ReplyMarkup::Keyboard { rows, one_time } => {
            let rows: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| {
                            if b.request_contact {
                                json!({ "text": b.text, "request_contact": true })
                            } else {
                                json!({ "text": b.text })
                            }
                        })
                        .collect()
                })
                .collect();
            json!({
                "keyboard": rows,
                "resize_keyboard": true,
                "one_time_keyboard": one_time,
            })
        }
        ReplyMarkup::RemoveKeyboard => json!({ "remove_keyboard": true }),
    }
}

pub async fn send_message(
    client: &TelegramClient,
    chat_id: ChatId,
    text: &str,
    markup: Option<&ReplyMarkup>,
) -> Result<MessageId, Error> {
    let mut body = Map::new();
    body.insert("chat_id".into(), json!(chat_id));
    body.insert("text".into(), json!(text));
    if let Some(m) = markup {
        body.insert("reply_markup".into(), markup_json(m));
    }
    let sent: Message = client.call("sendMessage", &Value::Object(body)).await?;
    Ok(sent.message_id)
}

/// sendPhoto / sendDocument. Known file ids go as JSON, everything else is uploaded.
pub async fn send_media(
    client: &TelegramClient,
    kind: MediaKind,
    chat_id: ChatId,
    file: InputFile,
    caption: Option<&str>,
    markup: Option<&ReplyMarkup>,
) -> Result<MessageId, Error> {
    let (file_name, data) = match file {
        InputFile::FileId(file_id) => {
            let mut body = Map::new();
            body.insert("chat_id".into(), json!(chat_id));
            body.insert(kind.field().into(), json!(file_id));
            if let Some(c) = caption {
                body.insert("caption".into(), json!(c));
            }
            if let Some(m) = markup {
                body.insert("reply_markup".into(), markup_json(m));
            }
            let sent: Message = client.call(kind.method(), &Value::Object(body)).await?;
            return Ok(sent.message_id);
        }
        InputFile::Path(path) => {
            let data = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| kind.field().to_string());
            (file_name, data)
        }
        InputFile::Bytes { file_name, data } => (file_name, data),
    };

    let mut form = Form::new()
        .text("chat_id", chat_id.to_string())
        .part(kind.field(), Part::bytes(data).file_name(file_name));
    if let Some(c) = caption {
        form = form.text("caption", c.to_string());
    }
    if let Some(m) = markup {
        form = form.text("reply_markup", markup_json(m).to_string());
    }
    let sent: Message = client.call_multipart(kind.method(), form).await?;
    Ok(sent.message_id)
}

pub async fn delete_message(client: &TelegramClient, chat_id: ChatId, message_id: MessageId) -> Result<(), Error> {
    let _: bool = client
        .call("deleteMessage", &json!({ "chat_id": chat_id, "message_id": message_id }))
        .await?;
    Ok(())
}

pub async fn answer_callback_query(client: &TelegramClient, callback_query_id: &str) -> Result<(), Error> {
    let _: bool = client
        .call("answerCallbackQuery", &json!({ "callback_query_id": callback_query_id }))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketbot_common::models::{InlineButton, KeyboardButton};

    #[test]
    fn test_inline_markup_json() {
        let markup = ReplyMarkup::Inline(vec![
            vec![InlineButton::new("Approve payment", "confirm_payment_1_2")],
            vec![InlineButton::new("Reject payment", "disable_payment_1_2")],
        ]);
        let v = markup_json(&markup);
        assert_eq!(v["inline_keyboard"][0][0]["text"], "Approve payment");
        assert_eq!(v["inline_keyboard"][1][0]["callback_data"], "disable_payment_1_2");
    }

    #[test]
    fn test_contact_keyboard_json() {
        let markup = ReplyMarkup::Keyboard {
            rows: vec![vec![KeyboardButton::contact("Share contact")], vec![KeyboardButton::text("Cancel")]],
            one_time: true,
        };
        let v = markup_json(&markup);
        assert_eq!(v["keyboard"][0][0]["request_contact"], true);
        assert!(v["keyboard"][1][0].get("request_contact").is_none());
        assert_eq!(v["one_time_keyboard"], true);
        assert_eq!(v["resize_keyboard"], true);
    }

    #[test]
    fn test_remove_keyboard_json() {
        assert_eq!(markup_json(&ReplyMarkup::RemoveKeyboard), json!({ "remove_keyboard": true }));
    }
}
