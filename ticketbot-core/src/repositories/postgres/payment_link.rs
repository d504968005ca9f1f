use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
pub use ticketbot_common::traits::repository_traits::PaymentLinkRepository;

#[derive(Clone)]
pub struct PostgresPaymentLinkRepository {
    pool: Pool<Postgres>,
}

impl PostgresPaymentLinkRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentLinkRepository for PostgresPaymentLinkRepository {
    async fn get_link(&self) -> Result<Option<String>, Error> {
        let row = sqlx::query("SELECT link FROM payment_link LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(r.try_get("link")?))
        } else {
            Ok(None)
        }
    }

    async fn set_link(&self, link: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO payment_link (singleton, link)
            VALUES (TRUE, $1)
            ON CONFLICT (singleton)
            DO UPDATE SET
               link       = EXCLUDED.link,
               updated_at = NOW()
            "#,
        )
            .bind(link)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
