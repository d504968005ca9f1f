// File: ticketbot-core/src/services/approval_service.rs

use std::sync::Arc;
use tracing::{debug, info, warn};
use ticketbot_common::models::{
    AdminNotification, ChatId, Event, InlineButton, InputFile, ReplyMarkup, Ticket, User,
};
use ticketbot_common::traits::api::ChatTransport;
use crate::config::ConfigProvider;
use crate::repositories::Repositories;
use crate::services::callbacks::CallbackAction;
use crate::services::dialogue::{Dialogue, DialogueRepository};
use crate::services::ticket_issuer::TicketIssuer;
use crate::Error;

/// How the buyer proved the payment.
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    Photo { file_id: String },
    Document { file_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// `ticket` is `None` when the purchase was recorded but the ticket could
    /// not be issued or delivered; both sides have been told.
    Approved { ticket: Option<Ticket> },
    Rejected,
    /// Another admin got there first. Nothing was done.
    AlreadyResolved,
}

/// Fans a pending purchase out to every admin and lets the first decision win.
pub struct ApprovalService {
    repos: Repositories,
    transport: Arc<dyn ChatTransport>,
    config: Arc<dyn ConfigProvider>,
    dialogues: Arc<dyn DialogueRepository>,
    issuer: TicketIssuer,
}

impl ApprovalService {
    pub fn new(
        repos: Repositories,
        transport: Arc<dyn ChatTransport>,
        config: Arc<dyn ConfigProvider>,
        dialogues: Arc<dyn DialogueRepository>,
        issuer: TicketIssuer,
    ) -> Self {
        Self {
            repos,
            transport,
            config,
            dialogues,
            issuer,
        }
    }

    /// Sends the receipt with Approve/Reject buttons to every admin and
    /// records one live prompt per delivered message. Returns how many
    /// admins were reached.
    pub async fn request_approval(
        &self,
        buyer: &User,
        username: Option<&str>,
        event: &Event,
        receipt: &Receipt,
    ) -> Result<usize, Error> {
        let mut admins: Vec<i64> = self.config.admin_ids().into_iter().collect();
        admins.sort_unstable();

        let caption = format!(
            "New payment!\n\nEvent: {}\nBuyer: {} (@{})\nAmount: {}",
            event.name,
            buyer.full_name,
            username.unwrap_or("-"),
            event.price
        );
        let markup = ReplyMarkup::Inline(vec![vec![
            InlineButton::new(
                "Approve payment",
                CallbackAction::Approve { buyer_id: buyer.user_id, event_id: event.event_id }.encode(),
            ),
            InlineButton::new(
                "Reject payment",
                CallbackAction::Reject { buyer_id: buyer.user_id, event_id: event.event_id }.encode(),
            ),
        ]]);

        let mut delivered = 0;
        for admin_id in admins {
            let sent = match receipt {
                Receipt::Photo { file_id } => {
                    self.transport
                        .send_image(admin_id, InputFile::FileId(file_id.clone()), Some(&caption), Some(markup.clone()))
                        .await
                }
                Receipt::Document { file_id } => {
                    self.transport
                        .send_document(admin_id, InputFile::FileId(file_id.clone()), Some(&caption), Some(markup.clone()))
                        .await
                }
            };
            match sent {
                Ok(message_id) => {
                    self.repos
                        .notifications
                        .add_notification(&AdminNotification {
                            admin_id,
                            message_id,
                            buyer_id: buyer.user_id,
                        })
                        .await?;
                    delivered += 1;
                }
                Err(e) => warn!("Could not send approval prompt to admin {}: {}", admin_id, e),
            }
        }

        info!(
            "Payment for event {} by user {} sent to {} admin(s)",
            event.event_id, buyer.user_id, delivered
        );
        Ok(delivered)
    }

    /// Settles the pending purchase of `buyer_id`.
    ///
    /// Taking the live prompts is the single atomic step: whoever takes a
    /// non-empty set owns the decision, every later call sees nothing and
    /// returns [`Resolution::AlreadyResolved`].
    pub async fn resolve(
        &self,
        admin_id: i64,
        buyer_id: i64,
        event_id: i64,
        decision: Decision,
    ) -> Result<Resolution, Error> {
        let prompts = self.repos.notifications.take_for_buyer(buyer_id).await?;
        if prompts.is_empty() {
            debug!(
                "Admin {} decided on user {} after the purchase was settled; ignoring",
                admin_id, buyer_id
            );
            return Ok(Resolution::AlreadyResolved);
        }

        for prompt in &prompts {
            if let Err(e) = self.transport.delete_message(prompt.admin_id, prompt.message_id).await {
                warn!(
                    "Could not retract prompt {} for admin {}: {}",
                    prompt.message_id, prompt.admin_id, e
                );
            }
        }

        let resolution = match decision {
            Decision::Approve => self.approve(admin_id, buyer_id, event_id).await?,
            Decision::Reject => {
                self.notify(admin_id, "You rejected the payment.").await;
                let text = format!(
                    "Your payment was rejected. Please contact the manager: {}",
                    self.config.manager_contact()
                );
                self.notify(buyer_id, &text).await;
                info!("Admin {} rejected payment of user {} for event {}", admin_id, buyer_id, event_id);
                Resolution::Rejected
            }
        };

        if let Some(Dialogue::Purchase(_)) = self.dialogues.get_state(buyer_id).await? {
            self.dialogues.clear_state(buyer_id).await?;
        }
        Ok(resolution)
    }

    async fn approve(&self, admin_id: i64, buyer_id: i64, event_id: i64) -> Result<Resolution, Error> {
        self.repos.user_events.add_user_event(buyer_id, event_id).await?;
        info!("Admin {} approved payment of user {} for event {}", admin_id, buyer_id, event_id);

        self.notify(admin_id, "You confirmed the payment.").await;
        self.notify(buyer_id, "Your payment is confirmed! The ticket is yours.").await;

        match self.issuer.issue(buyer_id, event_id).await {
            Ok(ticket) => Ok(Resolution::Approved { ticket: Some(ticket) }),
            Err(e) => {
                warn!("Ticket for user {} / event {} not delivered: {}", buyer_id, event_id, e);
                let text = format!(
                    "The ticket for user {} could not be issued or delivered. The purchase is recorded; see the bot log.",
                    buyer_id
                );
                self.notify(admin_id, &text).await;
                let text = format!(
                    "We could not send your ticket. Please contact the manager: {}",
                    self.config.manager_contact()
                );
                self.notify(buyer_id, &text).await;
                Ok(Resolution::Approved { ticket: None })
            }
        }
    }

    async fn notify(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text, None).await {
            warn!("Could not notify {}: {}", chat_id, e);
        }
    }
}
