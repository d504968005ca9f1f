// File: ticketbot-core/src/services/dialogue/event_create.rs

use ticketbot_common::models::{Incoming, IncomingKind};
use crate::services::bot_service::BotService;
use crate::services::dialogue::registration::text_answer;
use crate::services::dialogue::validate::{
    parse_album_link, parse_event_date, parse_price, parse_sale_flag, ValidationError,
};
use crate::services::dialogue::{DraftBasics, DraftListing, Dialogue, EventCreateStep};
use crate::services::menus;
use crate::Error;

/// File id of an uploaded picture, whether sent as a photo or as a file.
pub(crate) fn picture_answer(incoming: &Incoming) -> Result<String, ValidationError> {
    match &incoming.kind {
        IncomingKind::Photo { file_id } | IncomingKind::Document { file_id } => Ok(file_id.clone()),
        _ => Err(ValidationError::Photo),
    }
}

impl BotService {
    pub(crate) async fn start_event_create(&self, incoming: &Incoming) -> Result<(), Error> {
        self.set_dialogue(incoming.user_id, Dialogue::EventCreate(EventCreateStep::AwaitingName))
            .await?;
        self.reply_with(incoming, "Enter the event name:", menus::cancel_keyboard())
            .await
    }

    /// One answer per step; a rejected answer re-prompts and keeps the step.
    pub(crate) async fn advance_event_create(
        &self,
        incoming: &Incoming,
        step: EventCreateStep,
    ) -> Result<(), Error> {
        if self.cancelled(incoming, "Event creation cancelled.").await? {
            return Ok(());
        }

        let (next, prompt) = match step {
            EventCreateStep::AwaitingName => match text_answer(incoming) {
                Ok(name) => (
                    EventCreateStep::AwaitingDescription { name },
                    "Enter the event description:",
                ),
                Err(e) => return self.reprompt(incoming, e).await,
            },
            EventCreateStep::AwaitingDescription { name } => match text_answer(incoming) {
                Ok(description) => (
                    EventCreateStep::AwaitingPhoto {
                        basics: DraftBasics { name, description },
                    },
                    "Send the event photo:",
                ),
                Err(e) => return self.reprompt(incoming, e).await,
            },
            EventCreateStep::AwaitingPhoto { basics } => match &incoming.kind {
                IncomingKind::Photo { file_id } => (
                    EventCreateStep::AwaitingPrice {
                        basics,
                        photo_file_id: file_id.clone(),
                    },
                    "Enter the ticket price:",
                ),
                _ => return self.reprompt(incoming, ValidationError::Photo).await,
            },
            EventCreateStep::AwaitingPrice { basics, photo_file_id } => {
                match text_answer(incoming).and_then(|t| parse_price(&t)) {
                    Ok(price) => (
                        EventCreateStep::AwaitingDate {
                            basics,
                            photo_file_id,
                            price,
                        },
                        "Enter the event date (YYYY-MM-DD HH:MM):",
                    ),
                    Err(e) => return self.reprompt(incoming, e).await,
                }
            }
            EventCreateStep::AwaitingDate {
                basics,
                photo_file_id,
                price,
            } => match text_answer(incoming).and_then(|t| parse_event_date(&t)) {
                Ok(starts_at) => (
                    EventCreateStep::AwaitingSaleFlag {
                        basics,
                        photo_file_id,
                        price,
                        starts_at,
                    },
                    "Are ticket sales open? (Yes/No):",
                ),
                Err(e) => return self.reprompt(incoming, e).await,
            },
            EventCreateStep::AwaitingSaleFlag {
                basics,
                photo_file_id,
                price,
                starts_at,
            } => match text_answer(incoming).and_then(|t| parse_sale_flag(&t)) {
                Ok(is_sale_active) => (
                    EventCreateStep::AwaitingTemplate {
                        listing: DraftListing {
                            basics,
                            photo_file_id,
                            price,
                            starts_at,
                            is_sale_active,
                        },
                    },
                    "Send the QR code template (photo):",
                ),
                Err(e) => return self.reprompt(incoming, e).await,
            },
            EventCreateStep::AwaitingTemplate { listing } => {
                let file_id = match picture_answer(incoming) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                let file_name = format!(
                    "template_{}_{}.png",
                    incoming.user_id,
                    chrono::Local::now().format("%Y%m%d%H%M%S")
                );
                let template_path = self.admin.store_template(&file_id, &file_name).await?;
                (
                    EventCreateStep::AwaitingAlbumLink { listing, template_path },
                    "Enter the photo album link (or 'No'):",
                )
            }
            EventCreateStep::AwaitingAlbumLink { listing, template_path } => {
                let album = match text_answer(incoming).and_then(|t| parse_album_link(&t)) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                let event = listing.finish(template_path, album);
                self.admin.create_event(&event).await?;
                self.end_dialogue(incoming.user_id).await?;
                return self.reply_menu(incoming, "Event added!").await;
            }
        };

        self.set_dialogue(incoming.user_id, Dialogue::EventCreate(next)).await?;
        self.reply(incoming, prompt).await
    }
}
