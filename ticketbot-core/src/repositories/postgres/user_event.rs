use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
use crate::models::Event;
pub use ticketbot_common::traits::repository_traits::UserEventRepository;

#[derive(Clone)]
pub struct PostgresUserEventRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserEventRepository for PostgresUserEventRepository {
    async fn add_user_event(&self, user_id: i64, event_id: i64) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_events (user_id, event_id)
            VALUES ($1, $2)
            RETURNING user_event_id
            "#,
        )
            .bind(user_id)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("user_event_id")?)
    }

    async fn list_user_events(&self, user_id: i64) -> Result<Vec<Event>, Error> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.event_id, e.name, e.description, e.photo_file_id, e.price, e.starts_at,
                   e.is_sale_active, e.template_path, e.photo_album_link
            FROM events e
            JOIN user_events ue ON e.event_id = ue.event_id
            WHERE ue.user_id = $1
            ORDER BY ue.user_event_id
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }
}
