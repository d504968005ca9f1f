// File: ticketbot-core/src/services/ticket_issuer.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use image::ImageFormat;
use tracing::{info, warn};
use ticketbot_common::models::{InputFile, Ticket};
use ticketbot_common::traits::api::ChatTransport;
use ticketbot_common::traits::repository_traits::{EventRepository, TicketRepository};
use crate::config::ConfigProvider;
use crate::services::ticket_render::{
    bot_handle, load_template, render_ticket, ticket_deep_link, ticket_file_name,
};
use crate::Error;

/// Mints tickets for approved purchases and delivers them to the buyer.
pub struct TicketIssuer {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    transport: Arc<dyn ChatTransport>,
    config: Arc<dyn ConfigProvider>,
    tickets_dir: PathBuf,
}

impl TicketIssuer {
    pub fn new(
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketRepository>,
        transport: Arc<dyn ChatTransport>,
        config: Arc<dyn ConfigProvider>,
        tickets_dir: PathBuf,
    ) -> Self {
        Self {
            events,
            tickets,
            transport,
            config,
            tickets_dir,
        }
    }

    /// Issues one ticket for `(buyer_id, event_id)`.
    ///
    /// The template and the bot username are checked before anything is written. If rendering fails
    /// after the row exists, the row is deleted again. A failed delivery
    /// leaves the ticket in place (it can be re-sent from "My tickets") and
    /// is returned as the error.
    pub async fn issue(&self, buyer_id: i64, event_id: i64) -> Result<Ticket, Error> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::Precondition(format!("event {} not found", event_id)))?;

        let template_path = event.template_path.as_deref().ok_or_else(|| {
            Error::Precondition(format!("event '{}' has no ticket template", event.name))
        })?;
        let template = load_template(Path::new(template_path))?;
        bot_handle(&self.config.bot_username())?;

        let image_path = self.tickets_dir.join(ticket_file_name(buyer_id, event_id));
        let ticket = self
            .tickets
            .create_ticket(buyer_id, event_id, &image_path.to_string_lossy())
            .await?;

        if let Err(e) = self.render_and_save(&template, ticket.ticket_id, &image_path) {
            warn!(
                "Rendering ticket {} for user {} failed, removing it: {}",
                ticket.ticket_id, buyer_id, e
            );
            if let Err(del) = self.tickets.delete_ticket(ticket.ticket_id).await {
                warn!("Could not remove orphan ticket {}: {}", ticket.ticket_id, del);
            }
            return Err(e);
        }
        info!(
            "Issued ticket {} (user={}, event={})",
            ticket.ticket_id, buyer_id, event_id
        );

        let caption = format!("Your ticket for: {}", event.name);
        self.transport
            .send_image(buyer_id, InputFile::Path(image_path), Some(&caption), None)
            .await?;

        Ok(ticket)
    }

    fn render_and_save(
        &self,
        template: &image::RgbaImage,
        ticket_id: i64,
        image_path: &Path,
    ) -> Result<(), Error> {
        let link = ticket_deep_link(&self.config.bot_username(), ticket_id)?;
        let ticket_image = render_ticket(template, link.as_str())?;
        std::fs::create_dir_all(&self.tickets_dir)?;
        ticket_image.save_with_format(image_path, ImageFormat::Png)?;
        Ok(())
    }
}
