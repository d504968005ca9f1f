// File: ticketbot-core/src/services/dialogue/registration.rs
//
// Registration (name, university, contact), profile edits and the
// personal account views.

use tracing::info;
use ticketbot_common::models::{Incoming, IncomingKind, InputFile, User};
use crate::services::bot_service::BotService;
use crate::services::dialogue::validate::{non_empty, ValidationError};
use crate::services::dialogue::{Dialogue, ProfileEditStep, RegistrationStep};
use crate::services::menus;
use crate::Error;

impl BotService {
    pub(crate) async fn start_registration(&self, incoming: &Incoming) -> Result<(), Error> {
        self.set_dialogue(incoming.user_id, Dialogue::Registration(RegistrationStep::AwaitingName))
            .await?;
        self.reply_with(incoming, "Please enter your full name:", menus::cancel_keyboard())
            .await
    }

    pub(crate) async fn advance_registration(
        &self,
        incoming: &Incoming,
        step: RegistrationStep,
    ) -> Result<(), Error> {
        if self.cancelled(incoming, "Registration cancelled.").await? {
            return Ok(());
        }

        match step {
            RegistrationStep::AwaitingName => {
                let full_name = match text_answer(incoming) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                self.set_dialogue(
                    incoming.user_id,
                    Dialogue::Registration(RegistrationStep::AwaitingUniversity { full_name }),
                )
                .await?;
                self.reply_with(incoming, "Enter your university and faculty:", menus::cancel_keyboard())
                    .await
            }
            RegistrationStep::AwaitingUniversity { full_name } => {
                let university = match text_answer(incoming) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                self.set_dialogue(
                    incoming.user_id,
                    Dialogue::Registration(RegistrationStep::AwaitingContact { full_name, university }),
                )
                .await?;
                self.reply_with(
                    incoming,
                    "Share your contact by pressing the button below:",
                    menus::contact_keyboard(),
                )
                .await
            }
            RegistrationStep::AwaitingContact { full_name, university } => {
                let phone_number = match &incoming.kind {
                    IncomingKind::Contact { phone_number, contact_user_id }
                        if contact_user_id.is_none_or(|id| id == incoming.user_id) =>
                    {
                        phone_number.clone()
                    }
                    _ => {
                        return self
                            .reply_with(incoming, &ValidationError::OwnContact.to_string(), menus::contact_keyboard())
                            .await;
                    }
                };
                self.complete_registration(incoming, full_name, university, phone_number)
                    .await
            }
        }
    }

    async fn complete_registration(
        &self,
        incoming: &Incoming,
        full_name: String,
        university: String,
        phone_number: String,
    ) -> Result<(), Error> {
        if self.repos.users.get_user(incoming.user_id).await?.is_none() {
            let user = User {
                user_id: incoming.user_id,
                full_name,
                university,
                phone_number,
            };
            self.repos.users.create_user(&user).await?;
            info!("Registered user {}", user.user_id);
        }
        self.end_dialogue(incoming.user_id).await?;
        self.reply_menu(incoming, "Registration complete! Thank you.").await?;
        self.open_account(incoming).await
    }

    /// Shows the account card, or starts registration for strangers.
    pub(crate) async fn open_account(&self, incoming: &Incoming) -> Result<(), Error> {
        let Some(user) = self.repos.users.get_user(incoming.user_id).await? else {
            self.reply(incoming, "You are not registered yet. Let's fix that!").await?;
            return self.start_registration(incoming).await;
        };
        let attended = self.repos.user_events.list_user_events(user.user_id).await?.len();
        let text = format!(
            "Name: {}\nPhone number: {}\nUniversity: {}\nEvents attended: {}",
            user.full_name, user.phone_number, user.university, attended
        );
        self.reply_with(incoming, &text, menus::account_actions()).await
    }

    pub(crate) async fn show_my_events(&self, incoming: &Incoming) -> Result<(), Error> {
        if self.repos.users.get_user(incoming.user_id).await?.is_none() {
            return self.reply_menu(incoming, "You are not registered.").await;
        }
        let events = self.repos.user_events.list_user_events(incoming.user_id).await?;
        if events.is_empty() {
            return self.reply(incoming, "You have not attended any events yet.").await;
        }
        let mut text = String::from("Your events:\n\n");
        for event in &events {
            text.push_str(&format!("🎉 {}\n", event.name));
            if let Some(link) = &event.photo_album_link {
                text.push_str(&format!("📸 Photo album: {}\n", link));
            }
            text.push('\n');
        }
        self.reply(incoming, text.trim_end()).await
    }

    /// Re-sends every stored ticket picture.
    pub(crate) async fn show_my_tickets(&self, incoming: &Incoming) -> Result<(), Error> {
        if self.repos.users.get_user(incoming.user_id).await?.is_none() {
            return self.reply_menu(incoming, "You are not registered.").await;
        }
        let tickets = self.repos.tickets.list_user_tickets(incoming.user_id).await?;
        if tickets.is_empty() {
            return self.reply(incoming, "You have no tickets yet.").await;
        }
        for ticket in tickets {
            let caption = format!("Ticket for: {}", ticket.event_name);
            self.transport
                .send_image(incoming.chat_id, InputFile::Path(ticket.image_path.into()), Some(&caption), None)
                .await?;
        }
        Ok(())
    }

    pub(crate) async fn start_profile_edit(&self, incoming: &Incoming) -> Result<(), Error> {
        if self.repos.users.get_user(incoming.user_id).await?.is_none() {
            return self.reply_menu(incoming, "You are not registered.").await;
        }
        self.set_dialogue(incoming.user_id, Dialogue::ProfileEdit(ProfileEditStep::AwaitingName))
            .await?;
        self.reply_with(incoming, "Enter your new full name:", menus::cancel_keyboard())
            .await
    }

    pub(crate) async fn advance_profile_edit(
        &self,
        incoming: &Incoming,
        step: ProfileEditStep,
    ) -> Result<(), Error> {
        if self.cancelled(incoming, "Editing cancelled.").await? {
            return Ok(());
        }

        match step {
            ProfileEditStep::AwaitingName => {
                let full_name = match text_answer(incoming) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                self.set_dialogue(
                    incoming.user_id,
                    Dialogue::ProfileEdit(ProfileEditStep::AwaitingUniversity { full_name }),
                )
                .await?;
                self.reply_with(incoming, "Enter your new university and faculty:", menus::cancel_keyboard())
                    .await
            }
            ProfileEditStep::AwaitingUniversity { full_name } => {
                let university = match text_answer(incoming) {
                    Ok(v) => v,
                    Err(e) => return self.reprompt(incoming, e).await,
                };
                if !self
                    .repos
                    .users
                    .update_profile(incoming.user_id, &full_name, &university)
                    .await?
                {
                    return Err(Error::Precondition("your profile no longer exists".into()));
                }
                info!("User {} updated their profile", incoming.user_id);
                self.end_dialogue(incoming.user_id).await?;
                self.reply_menu(incoming, "Your data has been updated!").await
            }
        }
    }

    /// Re-prompts without touching the dialogue.
    pub(crate) async fn reprompt(&self, incoming: &Incoming, error: ValidationError) -> Result<(), Error> {
        self.reply(incoming, &error.to_string()).await
    }
}

/// The trimmed, non-empty text of a message.
pub(crate) fn text_answer(incoming: &Incoming) -> Result<String, ValidationError> {
    match &incoming.kind {
        IncomingKind::Text(text) => non_empty(text),
        _ => Err(ValidationError::Text),
    }
}
