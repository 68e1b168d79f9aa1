//! Authentication and API user service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{NewUser, RegisterUser, TokenPair, TokenType, UpdateProfile, User, UserClaims},
    repository::UsersStore,
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersStore>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    /// Register a new API user
    pub async fn register(&self, mut request: RegisterUser) -> AppResult<User> {
        request.email = request.email.filter(|e| !e.trim().is_empty());
        request.validate()?;

        if self.users.username_exists(&request.username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let user = NewUser {
            username: request.username,
            email: request.email.unwrap_or_default(),
            password_hash: self.hash_password(&request.password)?,
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
        };

        let created = self.users.create(&user).await?;
        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Authenticate by username and password and issue a token pair
    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let invalid = || {
            AppError::Authentication("No active account found with the given credentials".to_string())
        };

        let user = self.users.get_by_username(username).await?.ok_or_else(invalid)?;
        if !self.verify_password(&user, password)? {
            tracing::warn!(username, "Failed login attempt");
            return Err(invalid());
        }

        Ok(TokenPair {
            access: self.create_token(&user, TokenType::Access)?,
            refresh: self.create_token(&user, TokenType::Refresh)?,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = UserClaims::from_token(refresh_token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Invalid refresh token: {}", e)))?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Authentication("Token is not a refresh token".to_string()));
        }

        let user = match self.users.get_by_id(claims.user_id).await {
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication("User no longer exists".to_string()))
            }
            other => other?,
        };
        self.create_token(&user, TokenType::Access)
    }

    /// Validate an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> AppResult<UserClaims> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::Authentication("Token is not an access token".to_string()));
        }
        Ok(claims)
    }

    pub async fn profile(&self, user_id: i32) -> AppResult<User> {
        self.users.get_by_id(user_id).await
    }

    /// Update the current user's profile; only supplied fields change
    pub async fn update_profile(&self, user_id: i32, mut profile: UpdateProfile) -> AppResult<User> {
        profile.email = profile.email.filter(|e| !e.trim().is_empty());
        profile.validate()?;

        if let Some(ref username) = profile.username {
            if self.users.username_exists(username, Some(user_id)).await? {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }

        let password_hash = match profile.password {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.users.update_profile(user_id, &profile, password_hash).await
    }

    fn create_token(&self, user: &User, token_type: TokenType) -> AppResult<String> {
        let lifetime = match token_type {
            TokenType::Access => chrono::Duration::minutes(self.config.access_token_minutes),
            TokenType::Refresh => chrono::Duration::days(self.config.refresh_token_days),
        };

        UserClaims::issue(user, token_type, lifetime)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUsersStore;
    use chrono::Utc;

    fn stored_user(service: &AuthService, password: &str) -> User {
        User {
            id: 1,
            username: "admin".into(),
            email: String::new(),
            password: service.hash_password(password).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            date_joined: Utc::now(),
        }
    }

    fn service_with(users: MockUsersStore) -> AuthService {
        AuthService::new(Arc::new(users), AuthConfig::default())
    }

    #[tokio::test]
    async fn test_login_then_refresh() {
        let hashing = service_with(MockUsersStore::new());
        let user = stored_user(&hashing, "rahasia123");

        let mut users = MockUsersStore::new();
        let by_name = user.clone();
        users
            .expect_get_by_username()
            .withf(|name| name == "admin")
            .returning(move |_| Ok(Some(by_name.clone())));
        users.expect_get_by_id().returning(move |_| Ok(user.clone()));
        let service = service_with(users);

        let pair = service.login("admin", "rahasia123").await.unwrap();
        let access = service.verify_access_token(&pair.access).unwrap();
        assert_eq!(access.user_id, 1);

        // A refresh token is not accepted as an access token and vice versa
        assert!(service.verify_access_token(&pair.refresh).is_err());
        assert!(service.refresh(&pair.access).await.is_err());

        let renewed = service.refresh(&pair.refresh).await.unwrap();
        assert!(service.verify_access_token(&renewed).is_ok());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_fails() {
        let hashing = service_with(MockUsersStore::new());
        let user = stored_user(&hashing, "rahasia123");

        let mut users = MockUsersStore::new();
        users.expect_get_by_username().returning(move |_| Ok(Some(user.clone())));
        let service = service_with(users);

        assert!(matches!(
            service.login("admin", "salah").await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let mut users = MockUsersStore::new();
        users.expect_username_exists().returning(|_, _| Ok(true));
        users.expect_create().never();

        let result = service_with(users)
            .register(RegisterUser {
                username: "admin".into(),
                email: Some(String::new()),
                password: "rahasia123".into(),
                first_name: None,
                last_name: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut users = MockUsersStore::new();
        users.expect_username_exists().returning(|_, _| Ok(false));
        users
            .expect_create()
            .withf(|user| user.password_hash.starts_with("$argon2") && user.email.is_empty())
            .times(1)
            .returning(|user| {
                Ok(User {
                    id: 2,
                    username: user.username.clone(),
                    email: user.email.clone(),
                    password: user.password_hash.clone(),
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    date_joined: Utc::now(),
                })
            });

        let created = service_with(users)
            .register(RegisterUser {
                username: "pustakawan".into(),
                email: None,
                password: "rahasia123".into(),
                first_name: Some("Siti".into()),
                last_name: None,
            })
            .await
            .unwrap();
        assert_eq!(created.first_name, "Siti");
    }
}
