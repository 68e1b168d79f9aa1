//! Member (anggota) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Library member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
    /// Number of loans (any status) recorded for this member
    #[serde(rename = "total_peminjaman")]
    pub total_loans: i64,
}

/// Create or fully replace a member
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MemberInput {
    #[serde(rename = "nama")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Partial member update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MemberPatch {
    #[serde(rename = "nama")]
    pub name: Option<String>,
    pub email: Option<String>,
}

impl MemberPatch {
    pub fn apply(self, current: &Member) -> MemberInput {
        MemberInput {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
        }
    }
}

/// Member list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberQuery {
    /// Search in name or email
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_validated() {
        let input = MemberInput { name: "Alice".into(), email: "not-an-email".into() };
        assert!(input.validate().is_err());
        let input = MemberInput { name: "Alice".into(), email: "alice@example.org".into() };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_patch_and_wire_names() {
        let alice = Member { id: 3, name: "Alice".into(), email: "alice@example.org".into(), total_loans: 2 };
        let merged = MemberPatch { name: Some("Alicia".into()), email: None }.apply(&alice);
        assert_eq!(merged.name, "Alicia");
        assert_eq!(merged.email, "alice@example.org");

        let json = serde_json::to_value(&alice).unwrap();
        assert_eq!(json["nama"], "Alice");
        assert_eq!(json["total_peminjaman"], 2);
    }
}
