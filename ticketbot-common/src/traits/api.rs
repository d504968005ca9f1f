use async_trait::async_trait;
use crate::error::Error;
use crate::models::{ChatId, InputFile, MessageId, ReplyMarkup};

/// Everything the bot needs from the messaging platform.
///
/// Every send returns the platform message id so the message can be
/// retracted later (approval prompts rely on this).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error>;

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: InputFile,
        caption: Option<&str>,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error>;

    async fn send_document(
        &self,
        chat_id: ChatId,
        document: InputFile,
        caption: Option<&str>,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, Error>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), Error>;

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_button(&self, callback_id: &str) -> Result<(), Error>;

    /// Fetch the bytes of a file previously received from a user.
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, Error>;
}
