// File: ticketbot-core/src/test_utils/helpers.rs

use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::NaiveDate;
use image::{ImageFormat, Rgba, RgbaImage};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres};
use ticketbot_common::models::{Incoming, IncomingKind, NewEvent, User};
use crate::config::{BotSettings, ConfigProvider};
use crate::db::Database;
use crate::services::bot_service::BotService;
use crate::services::dialogue::InMemoryDialogueRepository;
use crate::test_utils::mocks::{InMemoryStore, RecordingTransport};
use crate::Error;

/// Create the test database if it does not exist yet.
pub async fn ensure_test_database_exists() -> Result<(), Error> {
    let admin_url = std::env::var("DATABASE_ADMIN_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string());
    let mut conn = PgConnection::connect(&admin_url).await?;

    let test_db = "ticketbot_test";
    match sqlx::query(&format!("CREATE DATABASE {test_db};")).execute(&mut conn).await {
        Ok(_) => println!("Created test DB '{test_db}'."),
        // 42P04 => duplicate_database
        Err(e) if e.as_database_error().and_then(|d| d.code()).as_deref() == Some("42P04") => {}
        Err(e) => return Err(Error::Database(e)),
    }
    Ok(())
}

/// Pool on `TEST_DATABASE_URL`, else `postgres://postgres@localhost/ticketbot_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/ticketbot_test".to_string());
    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(r#"
        TRUNCATE TABLE
            used_tickets,
            tickets,
            user_events,
            feedback,
            admin_notifications,
            payment_link,
            dialogue_states,
            users,
            events
        RESTART IDENTITY CASCADE;
    "#)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns a migrated, empty test DB handle.
pub async fn setup_test_database() -> Result<Database, Error> {
    ensure_test_database_exists().await?;
    let db = Database::from_pool(create_test_db_pool().await?);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(db)
}

/// Fixed configuration for tests.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub admins: HashSet<i64>,
    pub bot_username: String,
    pub manager_contact: String,
    pub news_channel_url: String,
}

impl StaticConfig {
    pub fn with_admins(admins: &[i64]) -> Self {
        Self {
            admins: admins.iter().copied().collect(),
            bot_username: "test_ticket_bot".to_string(),
            manager_contact: "@manager".to_string(),
            news_channel_url: "https://t.me/test_news".to_string(),
        }
    }
}

impl ConfigProvider for StaticConfig {
    fn admin_ids(&self) -> HashSet<i64> {
        self.admins.clone()
    }

    fn bot_username(&self) -> String {
        self.bot_username.clone()
    }

    fn manager_contact(&self) -> String {
        self.manager_contact.clone()
    }

    fn news_channel_url(&self) -> String {
        self.news_channel_url.clone()
    }
}

pub fn sample_user(user_id: i64) -> User {
    User {
        user_id,
        full_name: format!("Guest {user_id}"),
        university: "State University, Physics".to_string(),
        phone_number: format!("+7999000{user_id:04}"),
    }
}

/// An event far in the future with sales open and no template.
pub fn upcoming_event(name: &str) -> NewEvent {
    let starts_at = NaiveDate::from_ymd_opt(2099, 6, 1)
        .and_then(|d| d.and_hms_opt(19, 0, 0))
        .unwrap_or_default();
    NewEvent {
        name: name.to_string(),
        description: format!("{name} description"),
        photo_file_id: None,
        price: Decimal::new(500, 0),
        starts_at,
        is_sale_active: true,
        template_path: None,
        photo_album_link: None,
    }
}

/// A plain dark image large enough to hold the code box.
pub fn blank_template() -> RgbaImage {
    RgbaImage::from_pixel(600, 900, Rgba([20, 20, 20, 255]))
}

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    // encoding an in-memory RGBA buffer to PNG cannot fail
    let _ = image.write_to(&mut buf, ImageFormat::Png);
    buf.into_inner()
}

/// Writes `blank_template()` to `dir/file_name` and returns the path.
pub fn write_template(dir: &Path, file_name: &str) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    blank_template().save(&path)?;
    Ok(path)
}

fn incoming(user_id: i64, message_id: Option<i64>, kind: IncomingKind) -> Incoming {
    Incoming {
        user_id,
        chat_id: user_id,
        username: Some(format!("user{user_id}")),
        message_id,
        kind,
    }
}

pub fn text(user_id: i64, body: &str) -> Incoming {
    incoming(user_id, Some(1), IncomingKind::Text(body.to_string()))
}

pub fn button(user_id: i64, payload: &str, message_id: i64) -> Incoming {
    incoming(
        user_id,
        Some(message_id),
        IncomingKind::ButtonPress {
            callback_id: format!("cb-{user_id}-{message_id}"),
            payload: payload.to_string(),
        },
    )
}

pub fn photo(user_id: i64, file_id: &str) -> Incoming {
    incoming(user_id, Some(1), IncomingKind::Photo { file_id: file_id.to_string() })
}

pub fn document(user_id: i64, file_id: &str) -> Incoming {
    incoming(user_id, Some(1), IncomingKind::Document { file_id: file_id.to_string() })
}

/// The sender sharing their own contact.
pub fn own_contact(user_id: i64, phone_number: &str) -> Incoming {
    incoming(
        user_id,
        Some(1),
        IncomingKind::Contact {
            phone_number: phone_number.to_string(),
            contact_user_id: Some(user_id),
        },
    )
}

/// A whole bot wired to in-memory storage and a recording transport.
pub struct TestBot {
    pub store: InMemoryStore,
    pub transport: Arc<RecordingTransport>,
    pub dialogues: Arc<InMemoryDialogueRepository>,
    pub settings: BotSettings,
    pub bot: BotService,
}

impl TestBot {
    /// `root` holds the ticket and template directories.
    pub fn new(root: &Path, admins: &[i64]) -> Self {
        Self::with_config(root, StaticConfig::with_admins(admins))
    }

    pub fn with_config(root: &Path, config: StaticConfig) -> Self {
        let store = InMemoryStore::new();
        let transport = Arc::new(RecordingTransport::new());
        let dialogues = Arc::new(InMemoryDialogueRepository::new());
        let settings = BotSettings::for_directory(root);
        let bot = BotService::new(
            store.repositories(),
            transport.clone(),
            Arc::new(config),
            dialogues.clone(),
            settings.clone(),
        );
        Self {
            store,
            transport,
            dialogues,
            settings,
            bot,
        }
    }

    pub async fn send(&self, incoming: Incoming) {
        self.bot.handle_update(incoming).await;
    }

    pub async fn say(&self, user_id: i64, body: &str) {
        self.send(text(user_id, body)).await;
    }

    pub async fn press(&self, user_id: i64, payload: &str) {
        self.send(button(user_id, payload, 1)).await;
    }

    /// Text of the last message sent to `chat_id`.
    pub async fn last_text(&self, chat_id: i64) -> String {
        self.transport
            .last_to(chat_id)
            .await
            .map(|s| s.text().to_string())
            .unwrap_or_default()
    }
}
