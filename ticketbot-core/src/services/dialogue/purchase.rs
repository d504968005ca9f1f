// File: ticketbot-core/src/services/dialogue/purchase.rs
//
// Catalogue, rules, payment instructions and the receipt hand-off.

use tracing::info;
use ticketbot_common::models::{Event, Incoming, IncomingKind, InputFile};
use crate::services::approval_service::Receipt;
use crate::services::bot_service::BotService;
use crate::services::dialogue::{Dialogue, PurchaseStep};
use crate::services::menus;
use crate::Error;

const PURCHASE_PENDING: &str =
    "Your previous payment is still being checked. You can buy another ticket once it is settled.";

impl BotService {
    /// Whether an admin still has to decide on this user's purchase. The live
    /// prompts are recorded before the dialogue moves to `AwaitingApproval`
    /// and taken before it is cleared, so they are what counts.
    pub(crate) async fn purchase_pending(&self, user_id: i64) -> Result<bool, Error> {
        self.repos.notifications.has_pending(user_id).await
    }

    pub(crate) async fn open_catalogue(&self, incoming: &Incoming) -> Result<(), Error> {
        let events = self.repos.events.list_active_events(self.now()).await?;
        if events.is_empty() {
            let text = format!(
                "No tickets on sale right now. Follow the updates in our channel: {}",
                self.config.news_channel_url()
            );
            return self.reply_menu(incoming, &text).await;
        }

        if self.repos.users.get_user(incoming.user_id).await?.is_none() {
            self.reply(incoming, "You need to register before buying a ticket.").await?;
            return self.start_registration(incoming).await;
        }
        if self.purchase_pending(incoming.user_id).await? {
            return self.reply_menu(incoming, PURCHASE_PENDING).await;
        }

        for event in &events {
            let (text, markup) = menus::catalogue_entry(event);
            match &event.photo_file_id {
                Some(photo) => {
                    self.transport
                        .send_image(incoming.chat_id, InputFile::FileId(photo.clone()), Some(&text), Some(markup))
                        .await?;
                }
                None => self.reply_with(incoming, &text, markup).await?,
            }
        }
        Ok(())
    }

    /// An event a purchase can proceed with right now.
    async fn event_on_sale(&self, event_id: i64) -> Result<Option<Event>, Error> {
        let now = self.now();
        Ok(self
            .repos
            .events
            .get_event(event_id)
            .await?
            .filter(|e| e.is_active_at(now)))
    }

    pub(crate) async fn show_rules(&self, incoming: &Incoming, event_id: i64) -> Result<(), Error> {
        if self.purchase_pending(incoming.user_id).await? {
            return self.reply(incoming, PURCHASE_PENDING).await;
        }
        if self.event_on_sale(event_id).await?.is_none() {
            return self.reply(incoming, "This event is not on sale.").await;
        }
        self.set_dialogue(
            incoming.user_id,
            Dialogue::Purchase(PurchaseStep::ReviewingRules { event_id }),
        )
        .await?;

        let caption = "Please read the event rules before buying:";
        match &self.settings.rules_document {
            Some(path) => {
                self.transport
                    .send_document(
                        incoming.chat_id,
                        InputFile::Path(path.clone()),
                        Some(caption),
                        Some(menus::rules_actions(event_id)),
                    )
                    .await?;
                Ok(())
            }
            None => self.reply_with(incoming, caption, menus::rules_actions(event_id)).await,
        }
    }

    pub(crate) async fn show_payment(&self, incoming: &Incoming, event_id: i64) -> Result<(), Error> {
        if self.purchase_pending(incoming.user_id).await? {
            return self.reply(incoming, PURCHASE_PENDING).await;
        }
        let Some(event) = self.event_on_sale(event_id).await? else {
            return self.reply(incoming, "This event is not on sale.").await;
        };
        let link = self
            .admin
            .payment_link()
            .await?
            .ok_or_else(|| Error::Precondition("payment is not set up yet".into()))?;

        self.set_dialogue(
            incoming.user_id,
            Dialogue::Purchase(PurchaseStep::AwaitingPayment { event_id, price: event.price }),
        )
        .await?;
        let text = format!(
            "Tickets are paid as a donation.\n\nFollow the link {} and donate {}.",
            link, event.price
        );
        self.reply_with(incoming, &text, menus::payment_actions()).await
    }

    pub(crate) async fn ask_for_receipt(&self, incoming: &Incoming) -> Result<(), Error> {
        let Some(Dialogue::Purchase(PurchaseStep::AwaitingPayment { event_id, price })) =
            self.dialogues.get_state(incoming.user_id).await?
        else {
            return Err(Error::Precondition("the purchase data was not found".into()));
        };
        self.set_dialogue(
            incoming.user_id,
            Dialogue::Purchase(PurchaseStep::AwaitingReceipt { event_id, price }),
        )
        .await?;
        self.reply(
            incoming,
            "Please send a screenshot of the payment receipt so we can check your payment.",
        )
        .await
    }

    pub(crate) async fn cancel_purchase(&self, incoming: &Incoming) -> Result<(), Error> {
        if self.purchase_pending(incoming.user_id).await? {
            return self
                .reply(incoming, "Your payment is already being checked and can no longer be cancelled.")
                .await;
        }
        self.retract_source(incoming).await;
        self.end_dialogue(incoming.user_id).await?;
        self.reply_menu(incoming, "Purchase cancelled.").await
    }

    pub(crate) async fn advance_purchase(&self, incoming: &Incoming, step: PurchaseStep) -> Result<(), Error> {
        match step {
            PurchaseStep::AwaitingApproval { .. } => {
                self.reply(
                    incoming,
                    "Your payment is being checked. We will send the ticket as soon as it is confirmed.",
                )
                .await
            }
            PurchaseStep::ReviewingRules { .. } | PurchaseStep::AwaitingPayment { .. } => {
                if self.cancelled(incoming, "Purchase cancelled.").await? {
                    return Ok(());
                }
                self.reply(incoming, "Please use the buttons above.").await
            }
            PurchaseStep::AwaitingReceipt { event_id, .. } => {
                if self.cancelled(incoming, "Purchase cancelled.").await? {
                    return Ok(());
                }
                let receipt = match &incoming.kind {
                    IncomingKind::Photo { file_id } => Receipt::Photo { file_id: file_id.clone() },
                    IncomingKind::Document { file_id } => Receipt::Document { file_id: file_id.clone() },
                    _ => {
                        return self
                            .reply(incoming, "Please send the receipt as a photo or a file.")
                            .await;
                    }
                };
                self.submit_receipt(incoming, event_id, receipt).await
            }
        }
    }

    async fn submit_receipt(&self, incoming: &Incoming, event_id: i64, receipt: Receipt) -> Result<(), Error> {
        if self.purchase_pending(incoming.user_id).await? {
            self.end_dialogue(incoming.user_id).await?;
            return self.reply_menu(incoming, PURCHASE_PENDING).await;
        }
        let buyer = self
            .repos
            .users
            .get_user(incoming.user_id)
            .await?
            .ok_or_else(|| Error::Precondition("you are not registered".into()))?;
        let event = self
            .repos
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::Precondition("the event was not found".into()))?;

        let reached = self
            .approvals
            .request_approval(&buyer, incoming.username.as_deref(), &event, &receipt)
            .await?;
        if reached == 0 {
            self.end_dialogue(incoming.user_id).await?;
            let text = format!(
                "We could not reach an administrator. Please contact the manager: {}",
                self.config.manager_contact()
            );
            return self.reply_menu(incoming, &text).await;
        }

        self.set_dialogue(
            incoming.user_id,
            Dialogue::Purchase(PurchaseStep::AwaitingApproval { event_id }),
        )
        .await?;
        info!("User {} submitted a receipt for event {}", incoming.user_id, event_id);
        self.reply_menu(
            incoming,
            "Thank you! Your payment is being checked, we will send your ticket soon.",
        )
        .await
    }
}
