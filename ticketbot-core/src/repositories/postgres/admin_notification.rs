use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use crate::Error;
use crate::models::AdminNotification;
pub use ticketbot_common::traits::repository_traits::AdminNotificationRepository;

#[derive(Clone)]
pub struct PostgresAdminNotificationRepository {
    pool: Pool<Postgres>,
}

impl PostgresAdminNotificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminNotificationRepository for PostgresAdminNotificationRepository {
    async fn add_notification(&self, notification: &AdminNotification) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO admin_notifications (admin_id, message_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (admin_id, message_id) DO NOTHING
            "#,
        )
            .bind(notification.admin_id)
            .bind(notification.message_id)
            .bind(notification.buyer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn has_pending(&self, buyer_id: i64) -> Result<bool, Error> {
        let pending: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM admin_notifications WHERE user_id = $1)
            "#,
        )
            .bind(buyer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(pending)
    }

    async fn take_for_buyer(&self, buyer_id: i64) -> Result<Vec<AdminNotification>, Error> {
        // A single DELETE .. RETURNING: rows are locked while deleted, so a
        // concurrent caller blocks and then sees nothing left to take.
        let rows = sqlx::query_as::<_, AdminNotification>(
            r#"
            DELETE FROM admin_notifications
            WHERE user_id = $1
            RETURNING admin_id, message_id, user_id AS buyer_id
            "#,
        )
            .bind(buyer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
