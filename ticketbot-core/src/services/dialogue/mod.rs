//! Per-user conversation state.
//!
//! Each flow is a variant of [`Dialogue`]; each step of a flow carries only
//! what has been collected up to that point, so a handler never has to look
//! for a field that might be missing.

pub mod validate;
pub mod registration;
pub mod purchase;
pub mod event_create;
pub mod event_edit;
pub mod feedback;
pub mod admin_tools;

use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ticketbot_common::models::{EventField, NewEvent};
use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", content = "step", rename_all = "snake_case")]
pub enum Dialogue {
    Registration(RegistrationStep),
    ProfileEdit(ProfileEditStep),
    Purchase(PurchaseStep),
    EventCreate(EventCreateStep),
    EventEdit(EventEditStep),
    Feedback(FeedbackStep),
    PaymentLink(PaymentLinkStep),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistrationStep {
    AwaitingName,
    AwaitingUniversity { full_name: String },
    AwaitingContact { full_name: String, university: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProfileEditStep {
    AwaitingName,
    AwaitingUniversity { full_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PurchaseStep {
    /// Rules were sent; waiting for the acknowledgment button.
    ReviewingRules { event_id: i64 },
    /// Payment instructions were sent; waiting for the "paid" button.
    AwaitingPayment { event_id: i64, price: Decimal },
    AwaitingReceipt { event_id: i64, price: Decimal },
    /// Receipt forwarded to the admins; nothing left for the buyer to do.
    AwaitingApproval { event_id: i64 },
}

impl PurchaseStep {
    pub fn event_id(&self) -> i64 {
        match self {
            PurchaseStep::ReviewingRules { event_id }
            | PurchaseStep::AwaitingPayment { event_id, .. }
            | PurchaseStep::AwaitingReceipt { event_id, .. }
            | PurchaseStep::AwaitingApproval { event_id } => *event_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBasics {
    pub name: String,
    pub description: String,
}

/// Everything the create flow knows once the sale flag is in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftListing {
    pub basics: DraftBasics,
    pub photo_file_id: String,
    pub price: Decimal,
    pub starts_at: NaiveDateTime,
    pub is_sale_active: bool,
}

impl DraftListing {
    pub fn finish(self, template_path: String, photo_album_link: Option<String>) -> NewEvent {
        NewEvent {
            name: self.basics.name,
            description: self.basics.description,
            photo_file_id: Some(self.photo_file_id),
            price: self.price,
            starts_at: self.starts_at,
            is_sale_active: self.is_sale_active,
            template_path: Some(template_path),
            photo_album_link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EventCreateStep {
    AwaitingName,
    AwaitingDescription {
        name: String,
    },
    AwaitingPhoto {
        basics: DraftBasics,
    },
    AwaitingPrice {
        basics: DraftBasics,
        photo_file_id: String,
    },
    AwaitingDate {
        basics: DraftBasics,
        photo_file_id: String,
        price: Decimal,
    },
    AwaitingSaleFlag {
        basics: DraftBasics,
        photo_file_id: String,
        price: Decimal,
        starts_at: NaiveDateTime,
    },
    AwaitingTemplate {
        listing: DraftListing,
    },
    AwaitingAlbumLink {
        listing: DraftListing,
        template_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EventEditStep {
    ChoosingField { event_id: i64 },
    AwaitingValue { event_id: i64, field: EventField },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedbackStep {
    ChoosingEvent,
    AwaitingText { event_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentLinkStep {
    AwaitingLink,
}

/// Where each user's current dialogue lives between messages.
#[async_trait]
pub trait DialogueRepository: Send + Sync {
    async fn get_state(&self, user_id: i64) -> Result<Option<Dialogue>, Error>;
    async fn set_state(&self, user_id: i64, dialogue: &Dialogue) -> Result<(), Error>;
    /// Forgets the dialogue along with everything it collected.
    async fn clear_state(&self, user_id: i64) -> Result<(), Error>;
}

/// Process-local dialogue store. State is lost on restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDialogueRepository {
    states: Arc<DashMap<i64, Dialogue>>,
}

impl InMemoryDialogueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DialogueRepository for InMemoryDialogueRepository {
    async fn get_state(&self, user_id: i64) -> Result<Option<Dialogue>, Error> {
        Ok(self.states.get(&user_id).map(|d| d.value().clone()))
    }

    async fn set_state(&self, user_id: i64, dialogue: &Dialogue) -> Result<(), Error> {
        self.states.insert(user_id, dialogue.clone());
        Ok(())
    }

    async fn clear_state(&self, user_id: i64) -> Result<(), Error> {
        self.states.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_store_set_get_clear() {
        let store = InMemoryDialogueRepository::new();
        assert!(store.get_state(1).await.unwrap().is_none());

        let d = Dialogue::Registration(RegistrationStep::AwaitingUniversity {
            full_name: "Ann Lee".into(),
        });
        store.set_state(1, &d).await.unwrap();
        assert_eq!(store.get_state(1).await.unwrap(), Some(d));
        assert!(store.get_state(2).await.unwrap().is_none());

        store.clear_state(1).await.unwrap();
        assert!(store.get_state(1).await.unwrap().is_none());
    }

    #[test]
    fn test_dialogue_json_shape_survives_storage() {
        let starts_at = NaiveDate::from_ymd_opt(2030, 5, 1)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        let d = Dialogue::EventCreate(EventCreateStep::AwaitingSaleFlag {
            basics: DraftBasics {
                name: "Gala".into(),
                description: "Spring gala".into(),
            },
            photo_file_id: "photo-1".into(),
            price: dec("1500.50"),
            starts_at,
        });
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["flow"], "event_create");
        assert_eq!(json["step"]["state"], "awaiting_sale_flag");

        let back: Dialogue = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_purchase_step_event_id() {
        let step = PurchaseStep::AwaitingReceipt { event_id: 9, price: Decimal::ONE };
        assert_eq!(step.event_id(), 9);
    }
}
