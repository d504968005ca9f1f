use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
pub use ticketbot_common::traits::repository_traits::UsedTicketRepository;

#[derive(Clone)]
pub struct PostgresUsedTicketRepository {
    pool: Pool<Postgres>,
}

impl PostgresUsedTicketRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsedTicketRepository for PostgresUsedTicketRepository {
    async fn mark_used(&self, ticket_id: i64) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO used_tickets (ticket_id)
            VALUES ($1)
            ON CONFLICT (ticket_id) DO NOTHING
            "#,
        )
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_used(&self, ticket_id: i64) -> Result<bool, Error> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (SELECT 1 FROM used_tickets WHERE ticket_id = $1) AS used
            "#,
        )
            .bind(ticket_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("used")?)
    }
}
