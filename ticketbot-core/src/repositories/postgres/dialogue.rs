use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
use crate::services::dialogue::Dialogue;
pub use crate::services::dialogue::DialogueRepository;

/// Keeps dialogues in `dialogue_states` so half-finished conversations
/// survive a restart.
#[derive(Clone)]
pub struct PostgresDialogueRepository {
    pool: Pool<Postgres>,
}

impl PostgresDialogueRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DialogueRepository for PostgresDialogueRepository {
    async fn get_state(&self, user_id: i64) -> Result<Option<Dialogue>, Error> {
        let row = sqlx::query(
            r#"
            SELECT dialogue
            FROM dialogue_states
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let Json(dialogue): Json<Dialogue> = r.try_get("dialogue")?;
                Ok(Some(dialogue))
            }
            None => Ok(None),
        }
    }

    async fn set_state(&self, user_id: i64, dialogue: &Dialogue) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO dialogue_states (user_id, dialogue, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET dialogue = EXCLUDED.dialogue,
                          updated_at = NOW()
            "#,
        )
            .bind(user_id)
            .bind(Json(dialogue))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_state(&self, user_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM dialogue_states WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
