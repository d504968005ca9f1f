use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Format used for event start times everywhere: storage display, admin input, ticket cards.
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub event_id: i64,
    pub name: String,
    pub description: String,
    /// Platform file reference of the announcement photo.
    pub photo_file_id: Option<String>,
    pub price: Decimal,
    /// Local wall-clock start time.
    pub starts_at: NaiveDateTime,
    pub is_sale_active: bool,
    /// Path of the code-template image on disk.
    pub template_path: Option<String>,
    pub photo_album_link: Option<String>,
}

impl Event {
    /// An event is on sale iff sales are switched on and it has not started yet.
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        self.is_sale_active && self.starts_at > now
    }

    pub fn starts_at_display(&self) -> String {
        self.starts_at.format(EVENT_DATE_FORMAT).to_string()
    }
}

/// Everything the create flow collects before the single insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub photo_file_id: Option<String>,
    pub price: Decimal,
    pub starts_at: NaiveDateTime,
    pub is_sale_active: bool,
    pub template_path: Option<String>,
    pub photo_album_link: Option<String>,
}

/// The editable columns of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventField {
    Name,
    Description,
    Photo,
    Price,
    Date,
    SaleActive,
    Template,
    AlbumLink,
}

impl EventField {
    pub const ALL: [EventField; 8] = [
        EventField::Name,
        EventField::Description,
        EventField::Photo,
        EventField::Price,
        EventField::Date,
        EventField::SaleActive,
        EventField::Template,
        EventField::AlbumLink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventField::Name => "name",
            EventField::Description => "description",
            EventField::Photo => "photo",
            EventField::Price => "price",
            EventField::Date => "date",
            EventField::SaleActive => "sale",
            EventField::Template => "template",
            EventField::AlbumLink => "album",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Human label used on buttons and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            EventField::Name => "Name",
            EventField::Description => "Description",
            EventField::Photo => "Photo",
            EventField::Price => "Price",
            EventField::Date => "Date (YYYY-MM-DD HH:MM)",
            EventField::SaleActive => "Sale status",
            EventField::Template => "QR template",
            EventField::AlbumLink => "Photo album (or 'No')",
        }
    }
}

/// A single-column update. Applying one never touches any other column.
#[derive(Debug, Clone, PartialEq)]
pub enum EventFieldValue {
    Name(String),
    Description(String),
    Photo(String),
    Price(Decimal),
    Date(NaiveDateTime),
    SaleActive(bool),
    Template(String),
    AlbumLink(Option<String>),
}

impl EventFieldValue {
    pub fn field(&self) -> EventField {
        match self {
            EventFieldValue::Name(_) => EventField::Name,
            EventFieldValue::Description(_) => EventField::Description,
            EventFieldValue::Photo(_) => EventField::Photo,
            EventFieldValue::Price(_) => EventField::Price,
            EventFieldValue::Date(_) => EventField::Date,
            EventFieldValue::SaleActive(_) => EventField::SaleActive,
            EventFieldValue::Template(_) => EventField::Template,
            EventFieldValue::AlbumLink(_) => EventField::AlbumLink,
        }
    }

    pub fn apply_to(&self, event: &mut Event) {
        match self {
            EventFieldValue::Name(v) => event.name = v.clone(),
            EventFieldValue::Description(v) => event.description = v.clone(),
            EventFieldValue::Photo(v) => event.photo_file_id = Some(v.clone()),
            EventFieldValue::Price(v) => event.price = *v,
            EventFieldValue::Date(v) => event.starts_at = *v,
            EventFieldValue::SaleActive(v) => event.is_sale_active = *v,
            EventFieldValue::Template(v) => event.template_path = Some(v.clone()),
            EventFieldValue::AlbumLink(v) => event.photo_album_link = v.clone(),
        }
    }
}
