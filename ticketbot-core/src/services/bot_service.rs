// File: ticketbot-core/src/services/bot_service.rs

use std::sync::Arc;
use chrono::NaiveDateTime;
use tracing::{debug, error, warn};
use ticketbot_common::models::{Incoming, IncomingKind, InlineButton, ReplyMarkup};
use ticketbot_common::traits::api::ChatTransport;
use crate::config::{BotSettings, ConfigProvider};
use crate::repositories::Repositories;
use crate::services::approval_service::{ApprovalService, Decision, Resolution};
use crate::services::callbacks::CallbackAction;
use crate::services::dialogue::validate::is_cancel;
use crate::services::dialogue::{Dialogue, DialogueRepository, PurchaseStep};
use crate::services::event_admin_service::EventAdminService;
use crate::services::menus::{self, MenuCommand};
use crate::services::redemption_service::{
    parse_ticket_command, Inspection, Redemption, RedemptionService,
};
use crate::services::ticket_issuer::TicketIssuer;
use crate::Error;

/// Routes every inbound update to the right flow.
///
/// Updates are handled one at a time; each call runs to completion and
/// leaves the user's dialogue persisted for the next message.
pub struct BotService {
    pub(crate) repos: Repositories,
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) config: Arc<dyn ConfigProvider>,
    pub(crate) dialogues: Arc<dyn DialogueRepository>,
    pub(crate) settings: Arc<BotSettings>,
    pub(crate) approvals: ApprovalService,
    pub(crate) redemption: RedemptionService,
    pub(crate) admin: EventAdminService,
}

impl BotService {
    pub fn new(
        repos: Repositories,
        transport: Arc<dyn ChatTransport>,
        config: Arc<dyn ConfigProvider>,
        dialogues: Arc<dyn DialogueRepository>,
        settings: BotSettings,
    ) -> Self {
        let issuer = TicketIssuer::new(
            repos.events.clone(),
            repos.tickets.clone(),
            transport.clone(),
            config.clone(),
            settings.tickets_dir.clone(),
        );
        let approvals = ApprovalService::new(
            repos.clone(),
            transport.clone(),
            config.clone(),
            dialogues.clone(),
            issuer,
        );
        let redemption = RedemptionService::new(repos.clone());
        let admin = EventAdminService::new(repos.clone(), transport.clone(), settings.templates_dir.clone());

        Self {
            repos,
            transport,
            config,
            dialogues,
            settings: Arc::new(settings),
            approvals,
            redemption,
            admin,
        }
    }

    pub fn approvals(&self) -> &ApprovalService {
        &self.approvals
    }

    pub fn redemption(&self) -> &RedemptionService {
        &self.redemption
    }

    pub fn events(&self) -> &EventAdminService {
        &self.admin
    }

    /// Handles one update. Failures end the sender's dialogue and are
    /// reported to them; they never propagate further.
    pub async fn handle_update(&self, incoming: Incoming) {
        if let Err(e) = self.route(&incoming).await {
            error!("Update from user {} failed: {}", incoming.user_id, e);
            if let Err(ce) = self.dialogues.clear_state(incoming.user_id).await {
                warn!("Could not clear dialogue of user {}: {}", incoming.user_id, ce);
            }
            let text = match &e {
                Error::Precondition(msg) => format!("Sorry, {}. Please start again from the menu.", msg),
                Error::NotFound(what) => format!("Not found: {}.", what),
                _ => "Something went wrong. Please try again from the main menu.".to_string(),
            };
            if let Err(se) = self.reply_menu(&incoming, &text).await {
                warn!("Could not report failure to user {}: {}", incoming.user_id, se);
            }
        }
    }

    async fn route(&self, incoming: &Incoming) -> Result<(), Error> {
        match &incoming.kind {
            IncomingKind::ButtonPress { callback_id, payload } => {
                if let Err(e) = self.transport.answer_button(callback_id).await {
                    warn!("Could not acknowledge button press: {}", e);
                }
                match CallbackAction::parse(payload) {
                    Some(action) => self.on_button(incoming, action).await,
                    None => {
                        debug!("Ignoring unknown button payload '{}'", payload);
                        Ok(())
                    }
                }
            }
            IncomingKind::Text(text) if text.trim_start().starts_with("/start") => {
                self.on_start(incoming, text).await
            }
            IncomingKind::Text(text) => match MenuCommand::parse(text) {
                Some(command) => self.on_menu(incoming, command).await,
                None => self.on_dialogue_input(incoming).await,
            },
            _ => self.on_dialogue_input(incoming).await,
        }
    }

    async fn on_start(&self, incoming: &Incoming, text: &str) -> Result<(), Error> {
        if let Some(ticket_id) = parse_ticket_command(text) {
            return self.show_ticket(incoming, ticket_id).await;
        }
        self.abandon_dialogue(incoming.user_id).await?;
        self.reply_menu(
            incoming,
            "Hi! This is the event tickets bot.\n\nHere you can buy tickets, manage your account and leave feedback.",
        )
        .await
    }

    async fn on_menu(&self, incoming: &Incoming, command: MenuCommand) -> Result<(), Error> {
        debug!("User {} opened {:?}", incoming.user_id, command);
        if command.admin_only() && !self.require_admin(incoming).await? {
            return Ok(());
        }
        self.abandon_dialogue(incoming.user_id).await?;
        match command {
            MenuCommand::BuyTicket => self.open_catalogue(incoming).await,
            MenuCommand::MyAccount => self.open_account(incoming).await,
            MenuCommand::Feedback => {
                self.reply_with(incoming, "Choose an action:", menus::feedback_actions()).await
            }
            MenuCommand::ManageEvents => {
                self.reply_with(incoming, "Choose an action:", menus::manage_events_actions()).await
            }
            MenuCommand::UpdatePaymentLink => self.start_payment_link_update(incoming).await,
            MenuCommand::GuestList => self.open_guest_list_picker(incoming).await,
        }
    }

    async fn on_button(&self, incoming: &Incoming, action: CallbackAction) -> Result<(), Error> {
        debug!("User {} pressed {:?}", incoming.user_id, action);
        match action {
            CallbackAction::MainMenu => {
                self.retract_source(incoming).await;
                self.reply_menu(incoming, "⚡️ Main menu ⚡️").await
            }
            CallbackAction::Order { event_id } => self.show_rules(incoming, event_id).await,
            CallbackAction::AcceptRules { event_id } => self.show_payment(incoming, event_id).await,
            CallbackAction::PaymentSent => self.ask_for_receipt(incoming).await,
            CallbackAction::CancelPurchase => self.cancel_purchase(incoming).await,
            CallbackAction::Approve { buyer_id, event_id } => {
                self.decide(incoming, buyer_id, event_id, Decision::Approve).await
            }
            CallbackAction::Reject { buyer_id, event_id } => {
                self.decide(incoming, buyer_id, event_id, Decision::Reject).await
            }
            CallbackAction::Redeem { ticket_id } => self.redeem(incoming, ticket_id).await,
            CallbackAction::MyEvents => self.show_my_events(incoming).await,
            CallbackAction::MyTickets => self.show_my_tickets(incoming).await,
            CallbackAction::EditProfile => self.start_profile_edit(incoming).await,
            CallbackAction::ContactManager => {
                let text = format!("Contact the manager: {}", self.config.manager_contact());
                self.reply(incoming, &text).await
            }
            CallbackAction::LeaveFeedback => self.start_feedback(incoming).await,
            CallbackAction::FeedbackEvent { event_id } => {
                self.choose_feedback_event(incoming, event_id).await
            }
            CallbackAction::AddEvent
            | CallbackAction::EditEventMenu
            | CallbackAction::DeleteEventMenu
            | CallbackAction::EditEvent { .. }
            | CallbackAction::EditField { .. }
            | CallbackAction::DeleteEvent { .. }
            | CallbackAction::GuestList { .. } => {
                if !self.require_admin(incoming).await? {
                    return Ok(());
                }
                self.on_admin_button(incoming, action).await
            }
        }
    }

    async fn on_admin_button(&self, incoming: &Incoming, action: CallbackAction) -> Result<(), Error> {
        match action {
            CallbackAction::AddEvent => self.start_event_create(incoming).await,
            CallbackAction::EditEventMenu => self.open_edit_picker(incoming).await,
            CallbackAction::DeleteEventMenu => self.open_delete_picker(incoming).await,
            CallbackAction::EditEvent { event_id } => self.choose_event_to_edit(incoming, event_id).await,
            CallbackAction::EditField { field } => self.choose_field_to_edit(incoming, field).await,
            CallbackAction::DeleteEvent { event_id } => self.delete_event(incoming, event_id).await,
            CallbackAction::GuestList { event_id } => self.send_guest_list(incoming, event_id).await,
            _ => Ok(()),
        }
    }

    async fn on_dialogue_input(&self, incoming: &Incoming) -> Result<(), Error> {
        let Some(dialogue) = self.dialogues.get_state(incoming.user_id).await? else {
            return self.unknown_input(incoming).await;
        };
        match dialogue {
            Dialogue::Registration(step) => self.advance_registration(incoming, step).await,
            Dialogue::ProfileEdit(step) => self.advance_profile_edit(incoming, step).await,
            Dialogue::Purchase(step) => self.advance_purchase(incoming, step).await,
            Dialogue::EventCreate(step) => self.advance_event_create(incoming, step).await,
            Dialogue::EventEdit(step) => self.advance_event_edit(incoming, step).await,
            Dialogue::Feedback(step) => self.advance_feedback(incoming, step).await,
            Dialogue::PaymentLink(step) => self.advance_payment_link(incoming, step).await,
        }
    }

    async fn unknown_input(&self, incoming: &Incoming) -> Result<(), Error> {
        self.reply_with(
            incoming,
            "Careful, don't break me 🤖\n\nUse the buttons to get around :)",
            menus::back_to_menu(),
        )
        .await
    }

    async fn decide(
        &self,
        incoming: &Incoming,
        buyer_id: i64,
        event_id: i64,
        decision: Decision,
    ) -> Result<(), Error> {
        if !self.require_admin(incoming).await? {
            return Ok(());
        }
        let resolution = self
            .approvals
            .resolve(incoming.user_id, buyer_id, event_id, decision)
            .await?;
        if resolution == Resolution::AlreadyResolved {
            debug!("Decision on user {} arrived after another admin's", buyer_id);
        }
        Ok(())
    }

    async fn show_ticket(&self, incoming: &Incoming, ticket_id: i64) -> Result<(), Error> {
        match self.redemption.inspect(ticket_id).await? {
            Inspection::NotFound => self.reply(incoming, "❌ Ticket not found or invalid.").await,
            Inspection::Found { ticket, holder, event, valid } => {
                let mut text = format!(
                    "🎟 Ticket information\nName: {}\nEvent: {}\nDate: {}",
                    holder.full_name,
                    event.name,
                    event.starts_at_display()
                );
                if !self.config.is_admin(incoming.user_id) {
                    return self.reply(incoming, &text).await;
                }
                if valid {
                    text.push_str("\nStatus: ✅ Valid");
                    let markup = ReplyMarkup::inline_column(vec![InlineButton::new(
                        "Mark as used",
                        CallbackAction::Redeem { ticket_id: ticket.ticket_id }.encode(),
                    )]);
                    self.reply_with(incoming, &text, markup).await
                } else {
                    text.push_str("\nStatus: ❌ Already used");
                    self.reply(incoming, &text).await
                }
            }
        }
    }

    async fn redeem(&self, incoming: &Incoming, ticket_id: i64) -> Result<(), Error> {
        if !self.require_admin(incoming).await? {
            return Ok(());
        }
        let text = match self.redemption.mark_used(ticket_id).await? {
            Redemption::Redeemed => "Ticket marked as used!",
            Redemption::AlreadyUsed => "This ticket has already been used.",
            Redemption::NotFound => "❌ Ticket not found or invalid.",
        };
        self.reply(incoming, text).await
    }

    // Shared helpers for the flow modules.

    pub(crate) fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    pub(crate) fn is_admin(&self, user_id: i64) -> bool {
        self.config.is_admin(user_id)
    }

    /// Tells non-admins off. Returns whether the sender is an admin.
    pub(crate) async fn require_admin(&self, incoming: &Incoming) -> Result<bool, Error> {
        if self.is_admin(incoming.user_id) {
            return Ok(true);
        }
        warn!("User {} tried an admin-only action", incoming.user_id);
        self.reply(incoming, "This action is available to administrators only.").await?;
        Ok(false)
    }

    pub(crate) async fn reply(&self, incoming: &Incoming, text: &str) -> Result<(), Error> {
        self.transport.send_text(incoming.chat_id, text, None).await?;
        Ok(())
    }

    pub(crate) async fn reply_with(
        &self,
        incoming: &Incoming,
        text: &str,
        markup: ReplyMarkup,
    ) -> Result<(), Error> {
        self.transport.send_text(incoming.chat_id, text, Some(markup)).await?;
        Ok(())
    }

    /// Replies and puts the main menu keyboard back.
    pub(crate) async fn reply_menu(&self, incoming: &Incoming, text: &str) -> Result<(), Error> {
        let markup = menus::main_menu(self.is_admin(incoming.user_id));
        self.reply_with(incoming, text, markup).await
    }

    pub(crate) async fn set_dialogue(&self, user_id: i64, dialogue: Dialogue) -> Result<(), Error> {
        self.dialogues.set_state(user_id, &dialogue).await
    }

    pub(crate) async fn end_dialogue(&self, user_id: i64) -> Result<(), Error> {
        self.dialogues.clear_state(user_id).await
    }

    /// Drops whatever was in progress, except a purchase that is waiting
    /// for an admin decision.
    pub(crate) async fn abandon_dialogue(&self, user_id: i64) -> Result<(), Error> {
        match self.dialogues.get_state(user_id).await? {
            None | Some(Dialogue::Purchase(PurchaseStep::AwaitingApproval { .. })) => Ok(()),
            Some(_) => self.end_dialogue(user_id).await,
        }
    }

    /// Handles the cancel word: ends the dialogue and confirms with `notice`.
    /// Returns whether the input was a cancel.
    pub(crate) async fn cancelled(&self, incoming: &Incoming, notice: &str) -> Result<bool, Error> {
        match &incoming.kind {
            IncomingKind::Text(text) if is_cancel(text) => {
                self.end_dialogue(incoming.user_id).await?;
                self.reply_menu(incoming, notice).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Deletes the message a pressed button belongs to, if possible.
    pub(crate) async fn retract_source(&self, incoming: &Incoming) {
        if let Some(message_id) = incoming.message_id {
            if let Err(e) = self.transport.delete_message(incoming.chat_id, message_id).await {
                debug!("Could not delete message {}: {}", message_id, e);
            }
        }
    }
}
