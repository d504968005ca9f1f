use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
use crate::models::{Event, EventFieldValue, NewEvent};
pub use ticketbot_common::traits::repository_traits::EventRepository;

const EVENT_COLUMNS: &str = "event_id, name, description, photo_file_id, price, starts_at, \
                             is_sale_active, template_path, photo_album_link";

#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: Pool<Postgres>,
}

impl PostgresEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn create_event(&self, event: &NewEvent) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO events (
                name, description, photo_file_id, price, starts_at,
                is_sale_active, template_path, photo_album_link
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING event_id
            "#,
        )
            .bind(&event.name)
            .bind(&event.description)
            .bind(&event.photo_file_id)
            .bind(event.price)
            .bind(event.starts_at)
            .bind(event.is_sale_active)
            .bind(&event.template_path)
            .bind(&event.photo_album_link)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("event_id")?)
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>, Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY starts_at, event_id");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn list_active_events(&self, now: NaiveDateTime) -> Result<Vec<Event>, Error> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE is_sale_active AND starts_at > $1 \
             ORDER BY starts_at, event_id"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn update_field(&self, event_id: i64, value: &EventFieldValue) -> Result<bool, Error> {
        // One statement per column so a value can only ever land in its own column.
        let query = match value {
            EventFieldValue::Name(v) => {
                sqlx::query("UPDATE events SET name = $1 WHERE event_id = $2").bind(v.clone())
            }
            EventFieldValue::Description(v) => {
                sqlx::query("UPDATE events SET description = $1 WHERE event_id = $2").bind(v.clone())
            }
            EventFieldValue::Photo(v) => {
                sqlx::query("UPDATE events SET photo_file_id = $1 WHERE event_id = $2").bind(v.clone())
            }
            EventFieldValue::Price(v) => {
                sqlx::query("UPDATE events SET price = $1 WHERE event_id = $2").bind(*v)
            }
            EventFieldValue::Date(v) => {
                sqlx::query("UPDATE events SET starts_at = $1 WHERE event_id = $2").bind(*v)
            }
            EventFieldValue::SaleActive(v) => {
                sqlx::query("UPDATE events SET is_sale_active = $1 WHERE event_id = $2").bind(*v)
            }
            EventFieldValue::Template(v) => {
                sqlx::query("UPDATE events SET template_path = $1 WHERE event_id = $2").bind(v.clone())
            }
            EventFieldValue::AlbumLink(v) => {
                sqlx::query("UPDATE events SET photo_album_link = $1 WHERE event_id = $2").bind(v.clone())
            }
        };

        let result = query.bind(event_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
