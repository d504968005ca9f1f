use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
use crate::models::{AttendeeRow, Ticket, UserTicket};
pub use ticketbot_common::traits::repository_traits::TicketRepository;

#[derive(Clone)]
pub struct PostgresTicketRepository {
    pool: Pool<Postgres>,
}

impl PostgresTicketRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn create_ticket(&self, user_id: i64, event_id: i64, image_path: &str) -> Result<Ticket, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO tickets (user_id, event_id, image_path)
            VALUES ($1, $2, $3)
            RETURNING ticket_id
            "#,
        )
            .bind(user_id)
            .bind(event_id)
            .bind(image_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(Ticket {
            ticket_id: row.try_get("ticket_id")?,
            user_id,
            event_id,
            image_path: image_path.to_string(),
        })
    }

    async fn get_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>, Error> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, user_id, event_id, image_path
            FROM tickets
            WHERE ticket_id = $1
            "#,
        )
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn delete_ticket(&self, ticket_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM tickets WHERE ticket_id = $1")
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_user_tickets(&self, user_id: i64) -> Result<Vec<UserTicket>, Error> {
        let tickets = sqlx::query_as::<_, UserTicket>(
            r#"
            SELECT t.ticket_id, t.event_id, t.image_path, e.name AS event_name
            FROM tickets t
            JOIN events e ON e.event_id = t.event_id
            WHERE t.user_id = $1
            ORDER BY t.ticket_id
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn list_attendees(&self, event_id: i64) -> Result<Vec<AttendeeRow>, Error> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            r#"
            SELECT u.full_name, u.university, u.phone_number
            FROM users u
            JOIN tickets t ON u.user_id = t.user_id
            WHERE t.event_id = $1
            ORDER BY t.ticket_id
            "#,
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
