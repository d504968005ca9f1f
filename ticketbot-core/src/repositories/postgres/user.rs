use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use crate::Error;
use crate::models::User;
pub use ticketbot_common::traits::repository_traits::UserRepository;

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, full_name, university, phone_number)
            VALUES ($1, $2, $3, $4)
            "#,
        )
            .bind(user.user_id)
            .bind(&user.full_name)
            .bind(&user.university)
            .bind(&user.phone_number)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, full_name, university, phone_number
            FROM users
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(User {
                user_id: r.try_get("user_id")?,
                full_name: r.try_get("full_name")?,
                university: r.try_get("university")?,
                phone_number: r.try_get("phone_number")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn update_profile(&self, user_id: i64, full_name: &str, university: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name  = $1,
                university = $2
            WHERE user_id = $3
            "#,
        )
            .bind(full_name)
            .bind(university)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
