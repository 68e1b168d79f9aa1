//! API user model, authentication requests and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// API user. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial update of the current user's profile
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Values written to the users table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Access and refresh token pair
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Freshly issued access token
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub token_type: TokenType,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Build claims for `user` valid for `lifetime`
    pub fn issue(user: &User, token_type: TokenType, lifetime: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            token_type,
            jti: Uuid::new_v4().to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 11,
            username: "pustakawan".into(),
            email: "staff@example.org".into(),
            password: "$argon2id$hash".into(),
            first_name: "Siti".into(),
            last_name: "Aminah".into(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let claims = UserClaims::issue(&user(), TokenType::Refresh, chrono::Duration::days(1));
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 11);
        assert_eq!(parsed.sub, "pustakawan");
        assert_eq!(parsed.token_type, TokenType::Refresh);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = UserClaims::issue(&user(), TokenType::Access, chrono::Duration::hours(-2));
        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "pustakawan");
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterUser {
            username: "ab".into(),
            email: None,
            password: "12345".into(),
            first_name: None,
            last_name: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }
}
