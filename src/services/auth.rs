//! Authentication service: credential checks and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

/// Argon2id cost: 19 MiB of memory, 2 passes, 1 lane
const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password and return a bearer token
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> AppResult<(String, User)> {
        let (email, password) = match (email, password) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e.trim(), p),
            _ => {
                return Err(AppError::Validation(
                    "Email and password are required".to_string(),
                ))
            }
        };

        let Some(credentials) = self.repository.users.get_credentials_by_email(email).await? else {
            tracing::warn!(email, "Login failed: unknown email");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&credentials.password_hash, password)? {
            tracing::warn!(email, "Login failed: wrong password");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let user = User::from(credentials);
        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok((token, user))
    }

    /// Sign a one-hour token for `user`
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        UserClaims::new(user, Utc::now().timestamp())
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Check signature and expiry of a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    /// Public fields of the user a token was issued to
    pub async fn me(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.id).await
    }
}

fn hasher() -> AppResult<Argon2<'static>> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .map_err(|e| AppError::Internal(format!("Invalid hashing parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Compare a password against a stored hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
