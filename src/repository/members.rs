//! Members repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, MembersStore};
use crate::{
    error::{AppError, AppResult},
    models::member::{Member, MemberInput},
};

const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.name, m.email,
           (SELECT COUNT(*) FROM loans l WHERE l.member_id = m.id) AS total_loans
    FROM members m
"#;

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembersStore for MembersRepository {
    /// List members, optionally searching name and email
    async fn list(&self, search: Option<String>) -> AppResult<Vec<Member>> {
        let members = match search.filter(|s| !s.trim().is_empty()) {
            Some(term) => {
                let query = format!(
                    "{} WHERE LOWER(m.name) LIKE $1 OR LOWER(m.email) LIKE $1 ORDER BY m.id",
                    MEMBER_SELECT
                );
                sqlx::query_as::<_, Member>(&query)
                    .bind(contains_pattern(&term))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} ORDER BY m.id", MEMBER_SELECT);
                sqlx::query_as::<_, Member>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(members)
    }

    /// Get member by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        let query = format!("{} WHERE m.id = $1", MEMBER_SELECT);
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Create a new member
    async fn create(&self, member: &MemberInput) -> AppResult<Member> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO members (name, email) VALUES ($1, $2) RETURNING id",
        )
        .bind(&member.name)
        .bind(&member.email)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Replace a member's fields
    async fn update(&self, id: i32, member: &MemberInput) -> AppResult<Member> {
        let result = sqlx::query("UPDATE members SET name = $1, email = $2 WHERE id = $3")
            .bind(&member.name)
            .bind(&member.email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a member (loans are removed by ON DELETE CASCADE)
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all members
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
