// File: ticketbot-core/src/services/dialogue/feedback.rs

use tracing::{info, warn};
use ticketbot_common::models::Incoming;
use crate::services::bot_service::BotService;
use crate::services::callbacks::CallbackAction;
use crate::services::dialogue::registration::text_answer;
use crate::services::dialogue::{Dialogue, FeedbackStep};
use crate::services::menus;
use crate::Error;

impl BotService {
    pub(crate) async fn start_feedback(&self, incoming: &Incoming) -> Result<(), Error> {
        let events = self.repos.user_events.list_user_events(incoming.user_id).await?;
        if events.is_empty() {
            return self.reply(incoming, "You have not attended any events yet.").await;
        }
        self.set_dialogue(incoming.user_id, Dialogue::Feedback(FeedbackStep::ChoosingEvent))
            .await?;
        let picker = menus::event_picker(&events, |event_id| CallbackAction::FeedbackEvent { event_id });
        self.reply_with(incoming, "Which event would you like to review?", picker).await
    }

    pub(crate) async fn choose_feedback_event(&self, incoming: &Incoming, event_id: i64) -> Result<(), Error> {
        let attended = self.repos.user_events.list_user_events(incoming.user_id).await?;
        if !attended.iter().any(|e| e.event_id == event_id) {
            return self.reply(incoming, "You can only review events you attended.").await;
        }
        self.set_dialogue(
            incoming.user_id,
            Dialogue::Feedback(FeedbackStep::AwaitingText { event_id }),
        )
        .await?;
        self.reply_with(incoming, "Write your feedback:", menus::cancel_keyboard())
            .await
    }

    pub(crate) async fn advance_feedback(&self, incoming: &Incoming, step: FeedbackStep) -> Result<(), Error> {
        if self.cancelled(incoming, "Feedback cancelled.").await? {
            return Ok(());
        }
        let event_id = match step {
            FeedbackStep::ChoosingEvent => {
                return self.reply(incoming, "Please pick an event from the list above.").await;
            }
            FeedbackStep::AwaitingText { event_id } => event_id,
        };
        let body = match text_answer(incoming) {
            Ok(v) => v,
            Err(e) => return self.reprompt(incoming, e).await,
        };

        let event = self
            .repos
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::Precondition("the event was not found".into()))?;
        self.repos.feedback.add_feedback(incoming.user_id, event_id, &body).await?;
        info!("User {} left feedback on event {}", incoming.user_id, event_id);
        self.end_dialogue(incoming.user_id).await?;
        self.reply_menu(
            incoming,
            "Thank you for your feedback! It has been sent to the administrators.",
        )
        .await?;

        let author = self.repos.users.get_user(incoming.user_id).await?;
        let (name, phone) = author
            .map(|u| (u.full_name, u.phone_number))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        let text = format!(
            "New feedback on event: {}.\n\n👤 Name: {}\n☎️ Contact: {}\n📱 Telegram: @{}\nFeedback: {}",
            event.name,
            name,
            phone,
            incoming.username.as_deref().unwrap_or("-"),
            body
        );
        let mut admins: Vec<i64> = self.config.admin_ids().into_iter().collect();
        admins.sort_unstable();
        for admin_id in admins {
            if let Err(e) = self.transport.send_text(admin_id, &text, None).await {
                warn!("Could not forward feedback to admin {}: {}", admin_id, e);
            }
        }
        Ok(())
    }
}
