//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::UsersStore;
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, UpdateProfile, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_username_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Username already exists".to_string())
        }
        other => other.into(),
    }
}

#[async_trait]
impl UsersStore for UsersRepository {
    /// Get user by ID
    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (authentication)
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if username already exists
    async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id != $2)")
                .bind(username)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new user
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_username_conflict)
    }

    /// Update only the supplied profile fields
    async fn update_profile(
        &self,
        id: i32,
        profile: &UpdateProfile,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut sets: Vec<String> = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(profile.username, "username");
        add_field!(profile.email, "email");
        add_field!(profile.first_name, "first_name");
        add_field!(profile.last_name, "last_name");
        add_field!(password_hash, "password");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            param_idx
        );

        let mut builder = sqlx::query_as::<_, User>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(profile.username);
        bind_field!(profile.email);
        bind_field!(profile.first_name);
        bind_field!(profile.last_name);
        bind_field!(password_hash);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_username_conflict)?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}
