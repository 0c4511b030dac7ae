//! User model, credentials and token claims

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Lifetime of an issued token, in seconds
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Public user fields; the password hash never leaves the credential store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub user_name: Option<String>,
    pub email: String,
}

/// User row including the stored password hash (argon2)
///
/// Deliberately not `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub user_name: Option<String>,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

impl From<UserCredentials> for User {
    fn from(row: UserCredentials) -> Self {
        User {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
        }
    }
}

/// Create user (registration) request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub user_name: Option<String>,
    /// Login handle, unique across users
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[schema(write_only)]
    pub password: Option<String>,
}

/// Update user request; only supplied fields are changed
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub user_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[schema(write_only)]
    pub password: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_string())
}

impl CreateUser {
    /// Copy with surrounding whitespace removed from name and email
    pub fn normalized(&self) -> Self {
        Self {
            user_name: trimmed(&self.user_name),
            email: trimmed(&self.email),
            password: self.password.clone(),
        }
    }
}

impl UpdateUser {
    /// Copy with surrounding whitespace removed from name and email
    pub fn normalized(&self) -> Self {
        Self {
            user_name: trimmed(&self.user_name),
            email: trimmed(&self.email),
            password: self.password.clone(),
        }
    }
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: i32,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl UserClaims {
    /// Claims for `user`, issued at `now` (unix seconds)
    pub fn new(user: &User, now: i64) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token; expired tokens are rejected without leeway
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::errors::ErrorKind;

    fn user() -> User {
        User {
            id: 42,
            user_name: Some("bilbo".into()),
            email: "bilbo@shire.me".into(),
        }
    }

    #[test]
    fn test_claims_expire_one_hour_after_issue() {
        let claims = UserClaims::new(&user(), 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "bilbo@shire.me");
    }

    #[test]
    fn test_token_round_trip() {
        let claims = UserClaims::new(&user(), Utc::now().timestamp());
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed, claims);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let claims = UserClaims::new(&user(), Utc::now().timestamp());
        let token = claims.create_token("secret").unwrap();
        let err = UserClaims::from_token(&token, "other").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = UserClaims::new(&user(), Utc::now().timestamp() - 2 * TOKEN_LIFETIME_SECS);
        let token = claims.create_token("secret").unwrap();
        let err = UserClaims::from_token(&token, "secret").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn test_user_serialization_has_no_password() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["userName"], "bilbo");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_padded_email_is_valid_once_normalized() {
        let create = CreateUser {
            user_name: Some(" bilbo ".into()),
            email: Some(" a@b.co ".into()),
            password: Some(" pw ".into()),
        }
        .normalized();
        assert!(create.validate().is_ok());
        assert_eq!(create.email.as_deref(), Some("a@b.co"));
        assert_eq!(create.user_name.as_deref(), Some("bilbo"));
        assert_eq!(create.password.as_deref(), Some(" pw "));

        let update = UpdateUser {
            email: Some("\tfrodo@shire.me\n".into()),
            ..Default::default()
        }
        .normalized();
        assert!(update.validate().is_ok());
        assert_eq!(update.email.as_deref(), Some("frodo@shire.me"));
    }

    #[test]
    fn test_invalid_email_fails_validation() {
        let create = CreateUser {
            user_name: None,
            email: Some("not-an-email".into()),
            password: Some("pw".into()),
        };
        assert!(create.validate().is_err());
    }
}
