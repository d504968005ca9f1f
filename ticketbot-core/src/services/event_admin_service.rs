// File: ticketbot-core/src/services/event_admin_service.rs

use std::path::PathBuf;
use std::sync::Arc;
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;
use ticketbot_common::models::{AttendeeRow, Event, EventFieldValue, NewEvent};
use ticketbot_common::traits::api::ChatTransport;
use crate::repositories::Repositories;
use crate::services::ticket_render::save_template;
use crate::Error;

const ROSTER_HEADERS: [&str; 3] = ["Full name", "University", "Phone number"];

/// Writes the guest list as a single-sheet workbook.
pub fn export_roster(rows: &[AttendeeRow]) -> Result<Vec<u8>, Error> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Guests")?;

    for (col, header) in ROSTER_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.full_name)?;
        sheet.write_string(r, 1, &row.university)?;
        sheet.write_string(r, 2, &row.phone_number)?;
    }
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Event CRUD, the payment link and the guest list.
pub struct EventAdminService {
    repos: Repositories,
    transport: Arc<dyn ChatTransport>,
    templates_dir: PathBuf,
}

impl EventAdminService {
    pub fn new(repos: Repositories, transport: Arc<dyn ChatTransport>, templates_dir: PathBuf) -> Self {
        Self {
            repos,
            transport,
            templates_dir,
        }
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<i64, Error> {
        let event_id = self.repos.events.create_event(event).await?;
        info!("Created event {} '{}'", event_id, event.name);
        Ok(event_id)
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, Error> {
        self.repos.events.list_events().await
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Event, Error> {
        self.repos
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("event {}", event_id)))
    }

    /// Changes exactly one column.
    pub async fn update_field(&self, event_id: i64, value: &EventFieldValue) -> Result<(), Error> {
        if !self.repos.events.update_field(event_id, value).await? {
            return Err(Error::NotFound(format!("event {}", event_id)));
        }
        info!("Event {}: updated {}", event_id, value.field().as_str());
        Ok(())
    }

    /// Tickets, redemptions and purchases of the event go with it.
    pub async fn delete_event(&self, event_id: i64) -> Result<bool, Error> {
        let deleted = self.repos.events.delete_event(event_id).await?;
        if deleted {
            info!("Deleted event {}", event_id);
        }
        Ok(deleted)
    }

    /// `None` when nobody holds a ticket yet.
    pub async fn guest_list(&self, event_id: i64) -> Result<Option<Vec<u8>>, Error> {
        let rows = self.repos.tickets.list_attendees(event_id).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(export_roster(&rows)?))
    }

    /// Downloads an uploaded photo and keeps it as a ticket template.
    pub async fn store_template(&self, file_id: &str, file_name: &str) -> Result<String, Error> {
        let bytes = self.transport.download_file(file_id).await?;
        let path = save_template(&bytes, &self.templates_dir, file_name)?;
        info!("Stored ticket template {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    pub async fn payment_link(&self) -> Result<Option<String>, Error> {
        self.repos.payment_link.get_link().await
    }

    pub async fn set_payment_link(&self, link: &str) -> Result<(), Error> {
        self.repos.payment_link.set_link(link).await?;
        info!("Payment link updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_roster_produces_xlsx() {
        let rows = vec![
            AttendeeRow {
                full_name: "Ann Lee".into(),
                university: "MSU, Physics".into(),
                phone_number: "+79990000001".into(),
            },
            AttendeeRow {
                full_name: "Bo Chen".into(),
                university: "HSE".into(),
                phone_number: "+79990000002".into(),
            },
        ];
        let bytes = export_roster(&rows).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }
}
