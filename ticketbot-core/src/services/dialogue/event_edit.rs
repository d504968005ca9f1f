// File: ticketbot-core/src/services/dialogue/event_edit.rs

use ticketbot_common::models::{EventField, EventFieldValue, Incoming, IncomingKind};
use crate::services::bot_service::BotService;
use crate::services::callbacks::CallbackAction;
use crate::services::dialogue::event_create::picture_answer;
use crate::services::dialogue::registration::text_answer;
use crate::services::dialogue::validate::{
    parse_album_link, parse_event_date, parse_price, parse_sale_flag, ValidationError,
};
use crate::services::dialogue::{Dialogue, EventEditStep};
use crate::services::menus;
use crate::Error;

fn value_prompt(field: EventField) -> String {
    match field {
        EventField::Photo => "Send the new event photo:".to_string(),
        EventField::Template => "Send the new QR code template (photo):".to_string(),
        EventField::SaleActive => "Are ticket sales open? (Yes/No):".to_string(),
        other => format!("Enter the new value for {}:", other.label()),
    }
}

impl BotService {
    pub(crate) async fn open_edit_picker(&self, incoming: &Incoming) -> Result<(), Error> {
        let events = self.admin.list_events().await?;
        if events.is_empty() {
            return self.reply(incoming, "There are no events to edit.").await;
        }
        let picker = menus::event_picker(&events, |event_id| CallbackAction::EditEvent { event_id });
        self.reply_with(incoming, "Choose the event to edit:", picker).await
    }

    pub(crate) async fn choose_event_to_edit(&self, incoming: &Incoming, event_id: i64) -> Result<(), Error> {
        let event = self.admin.get_event(event_id).await?;
        self.set_dialogue(
            incoming.user_id,
            Dialogue::EventEdit(EventEditStep::ChoosingField { event_id: event.event_id }),
        )
        .await?;
        let text = format!("What do you want to change in '{}'?", event.name);
        self.reply_with(incoming, &text, menus::field_picker()).await
    }

    pub(crate) async fn choose_field_to_edit(&self, incoming: &Incoming, field: EventField) -> Result<(), Error> {
        let event_id = match self.dialogues.get_state(incoming.user_id).await? {
            Some(Dialogue::EventEdit(EventEditStep::ChoosingField { event_id }))
            | Some(Dialogue::EventEdit(EventEditStep::AwaitingValue { event_id, .. })) => event_id,
            _ => return Err(Error::Precondition("no event is selected for editing".into())),
        };
        self.set_dialogue(
            incoming.user_id,
            Dialogue::EventEdit(EventEditStep::AwaitingValue { event_id, field }),
        )
        .await?;
        self.reply_with(incoming, &value_prompt(field), menus::cancel_keyboard())
            .await
    }

    pub(crate) async fn advance_event_edit(&self, incoming: &Incoming, step: EventEditStep) -> Result<(), Error> {
        if self.cancelled(incoming, "Editing cancelled.").await? {
            return Ok(());
        }
        let (event_id, field) = match step {
            EventEditStep::ChoosingField { .. } => {
                return self.reply(incoming, "Please pick a field using the buttons above.").await;
            }
            EventEditStep::AwaitingValue { event_id, field } => (event_id, field),
        };

        let value = match self.read_field_value(incoming, event_id, field).await? {
            Ok(v) => v,
            Err(e) => return self.reprompt(incoming, e).await,
        };
        self.admin.update_field(event_id, &value).await?;
        self.end_dialogue(incoming.user_id).await?;
        let text = format!("'{}' updated!", field.label());
        self.reply_menu(incoming, &text).await
    }

    /// Parses the answer with the same validator the create flow uses for
    /// that field. Templates are downloaded and stored here.
    async fn read_field_value(
        &self,
        incoming: &Incoming,
        event_id: i64,
        field: EventField,
    ) -> Result<Result<EventFieldValue, ValidationError>, Error> {
        let parsed = match field {
            EventField::Name => text_answer(incoming).map(EventFieldValue::Name),
            EventField::Description => text_answer(incoming).map(EventFieldValue::Description),
            EventField::Photo => match &incoming.kind {
                IncomingKind::Photo { file_id } => Ok(EventFieldValue::Photo(file_id.clone())),
                _ => Err(ValidationError::Photo),
            },
            EventField::Price => text_answer(incoming)
                .and_then(|t| parse_price(&t))
                .map(EventFieldValue::Price),
            EventField::Date => text_answer(incoming)
                .and_then(|t| parse_event_date(&t))
                .map(EventFieldValue::Date),
            EventField::SaleActive => text_answer(incoming)
                .and_then(|t| parse_sale_flag(&t))
                .map(EventFieldValue::SaleActive),
            EventField::AlbumLink => text_answer(incoming)
                .and_then(|t| parse_album_link(&t))
                .map(EventFieldValue::AlbumLink),
            EventField::Template => match picture_answer(incoming) {
                Ok(file_id) => {
                    let file_name = format!("template_{}.png", event_id);
                    let path = self.admin.store_template(&file_id, &file_name).await?;
                    Ok(EventFieldValue::Template(path))
                }
                Err(e) => Err(e),
            },
        };
        Ok(parsed)
    }
}
