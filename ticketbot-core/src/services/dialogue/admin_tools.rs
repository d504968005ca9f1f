// File: ticketbot-core/src/services/dialogue/admin_tools.rs
//
// Event deletion, guest lists and the payment link.

use ticketbot_common::models::{Incoming, InputFile};
use crate::services::bot_service::BotService;
use crate::services::callbacks::CallbackAction;
use crate::services::dialogue::registration::text_answer;
use crate::services::dialogue::validate::parse_link;
use crate::services::dialogue::{Dialogue, PaymentLinkStep};
use crate::services::menus;
use crate::Error;

impl BotService {
    pub(crate) async fn open_delete_picker(&self, incoming: &Incoming) -> Result<(), Error> {
        let events = self.admin.list_events().await?;
        if events.is_empty() {
            return self.reply(incoming, "There are no events to delete.").await;
        }
        let picker = menus::event_picker(&events, |event_id| CallbackAction::DeleteEvent { event_id });
        self.reply_with(incoming, "Choose the event to delete:", picker).await
    }

    pub(crate) async fn delete_event(&self, incoming: &Incoming, event_id: i64) -> Result<(), Error> {
        if self.admin.delete_event(event_id).await? {
            self.reply_menu(incoming, "Event deleted!").await
        } else {
            self.reply_menu(incoming, "The event was already gone.").await
        }
    }

    pub(crate) async fn open_guest_list_picker(&self, incoming: &Incoming) -> Result<(), Error> {
        let events = self.admin.list_events().await?;
        if events.is_empty() {
            return self.reply(incoming, "There are no events yet.").await;
        }
        let picker = menus::event_picker(&events, |event_id| CallbackAction::GuestList { event_id });
        self.reply_with(incoming, "Choose the event:", picker).await
    }

    pub(crate) async fn send_guest_list(&self, incoming: &Incoming, event_id: i64) -> Result<(), Error> {
        let event = self.admin.get_event(event_id).await?;
        let Some(data) = self.admin.guest_list(event_id).await? else {
            let text = format!("Nobody has a ticket for '{}' yet.", event.name);
            return self.reply(incoming, &text).await;
        };
        let caption = format!("Guest list: {}", event.name);
        self.transport
            .send_document(
                incoming.chat_id,
                InputFile::Bytes {
                    file_name: format!("guests_{}.xlsx", event_id),
                    data,
                },
                Some(&caption),
                None,
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn start_payment_link_update(&self, incoming: &Incoming) -> Result<(), Error> {
        self.set_dialogue(incoming.user_id, Dialogue::PaymentLink(PaymentLinkStep::AwaitingLink))
            .await?;
        self.reply_with(incoming, "Enter the new payment link:", menus::cancel_keyboard())
            .await
    }

    pub(crate) async fn advance_payment_link(&self, incoming: &Incoming, step: PaymentLinkStep) -> Result<(), Error> {
        if self.cancelled(incoming, "Payment link unchanged.").await? {
            return Ok(());
        }
        match step {
            PaymentLinkStep::AwaitingLink => {
                let link = match text_answer(incoming).and_then(|t| parse_link(&t)) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                self.admin.set_payment_link(&link).await?;
                self.end_dialogue(incoming.user_id).await?;
                self.reply_menu(incoming, "Payment link updated!").await
            }
        }
    }
}
