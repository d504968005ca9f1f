// File: ticketbot-core/src/platforms/telegram/client.rs

use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ticketbot_common::models::{ChatId, InputFile, MessageId, ReplyMarkup};
use ticketbot_common::traits::api::ChatTransport;
use crate::platforms::telegram::requests::{files, messages};
use crate::Error;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, method: &str) -> Result<T, Error> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(Error::Platform(format!(
                "{} failed: {}",
                method,
                self.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

/// Thin Bot API client. Endpoint wrappers live in `requests::*`.
pub struct TelegramClient {
    http: Arc<ReqwestClient>,
    token: String,
    api_base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Points the client at a different Bot API server (a local one, or a test double).
    pub fn with_api_base(token: &str, api_base: &str) -> Self {
        Self {
            http: Arc::new(ReqwestClient::new()),
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn http_client(&self) -> Arc<ReqwestClient> {
        self.http.clone()
    }

    /// The token is part of every request URL.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    pub fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    /// POSTs `body` as JSON and unwraps the response envelope.
    pub async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Bot API call {}", method);
        let resp = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;
        Self::read_envelope(method, resp).await
    }

    /// POSTs a multipart form (used when uploading files).
    pub async fn call_multipart<T>(&self, method: &str, form: Form) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        debug!("Bot API upload {}", method);
        let resp = self
            .http
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;
        Self::read_envelope(method, resp).await
    }

    async fn read_envelope<T: DeserializeOwned>(method: &str, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body_text = resp.text().await.map_err(|e| transport_error(method, e))?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body_text).map_err(|e| {
            Error::Platform(format!("{}: HTTP {} => unparseable body ({}): {}", method, status, e, body_text))
        })?;
        envelope.into_result(method)
    }
}

/// Wraps a reqwest failure without the request URL, which embeds the bot token.
pub(crate) fn transport_error(context: &str, e: reqwest::Error) -> Error {
    Error::Platform(format!("{} network error: {}", context, e.without_url()))
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error> {
        messages::send_message(self, chat_id, text, markup.as_ref()).await
    }

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: InputFile,
        caption: Option<&str>,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error> {
        messages::send_media(self, messages::MediaKind::Photo, chat_id, image, caption, markup.as_ref()).await
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        document: InputFile,
        caption: Option<&str>,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error> {
        messages::send_media(self, messages::MediaKind::Document, chat_id, document, caption, markup.as_ref()).await
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), Error> {
        messages::delete_message(self, chat_id, message_id).await
    }

    async fn answer_button(&self, callback_id: &str) -> Result<(), Error> {
        messages::answer_callback_query(self, callback_id).await
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, Error> {
        files::download(self, file_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = TelegramClient::with_api_base("123:abc", "http://localhost:8081/");
        assert_eq!(client.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
        assert_eq!(
            client.file_url("photos/file_1.jpg"),
            "http://localhost:8081/file/bot123:abc/photos/file_1.jpg"
        );
    }

    #[test]
    fn test_envelope_error_carries_description() {
        let env: ApiResponse<i64> =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
                .unwrap();
        match env.into_result("sendMessage") {
            Err(Error::Platform(msg)) => assert!(msg.contains("chat not found")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error_hides_token() {
        // nothing listens on port 1
        let client = TelegramClient::with_api_base("123:SECRET_TOKEN", "http://127.0.0.1:1");
        let err = client.send_text(42, "hello", None).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Platform error: sendMessage network error"), "{msg}");
        assert!(!msg.contains("SECRET_TOKEN"), "{msg}");
    }
}
