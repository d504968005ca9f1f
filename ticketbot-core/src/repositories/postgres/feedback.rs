use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
pub use ticketbot_common::traits::repository_traits::FeedbackRepository;

#[derive(Clone)]
pub struct PostgresFeedbackRepository {
    pool: Pool<Postgres>,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn add_feedback(&self, user_id: i64, event_id: i64, body: &str) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO feedback (user_id, event_id, body)
            VALUES ($1, $2, $3)
            RETURNING feedback_id
            "#,
        )
            .bind(user_id)
            .bind(event_id)
            .bind(body)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("feedback_id")?)
    }
}
