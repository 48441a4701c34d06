use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::config::Config;
use crate::db::Database;
use crate::error::{is_unique_violation, AppError, Result};
use crate::middleware::Claims;
use crate::models::{User, UserRole};

pub struct AuthService {
    db: Database,
    config: Config,
}

impl AuthService {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(User, String)> {
        let email = email.trim().to_lowercase();
        let password_hash = hash_password(password)?;

        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'user', NOW(), NOW())
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(name.trim())
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.db.pg)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::BadRequest("Email is already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::info!(user_id = %user.id, "User registered");

        let token = self.generate_access_token(&user)?;
        Ok((user, token))
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user: User = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or(AppError::Unauthorized)?;

        verify_password(password, &user.password_hash)?;

        let token = self.generate_access_token(&user)?;
        Ok((user, token))
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<User> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        issue_token(user.id, &user.email, user.role, &self.config)
    }
}

pub fn issue_token(user_id: Uuid, email: &str, role: UserRole, config: &Config) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(config.jwt.expiry_hours as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)
}
