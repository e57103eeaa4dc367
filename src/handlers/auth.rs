use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::utils::validation::required_text;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            role: u.role,
        }
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn validate_password(password: Option<String>) -> AppResult<String> {
    let password = required_text(password, "password")?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(password)
}

pub fn validate_email(email: Option<String>) -> AppResult<String> {
    let email = required_text(email, "email")?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation("please fill email correctly".to_string())),
    }
}

fn issue(state: &AppState, user: user::Model) -> AppResult<AuthResponse> {
    let token = create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// Register a new customer account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let name = required_text(payload.name, "name")?;
    let email = validate_email(payload.email)?;
    let phone = required_text(payload.phone, "phone")?;
    let password = validate_password(payload.password)?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let new_user = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        password_hash: Set(hash_password(&password)?),
        role: Set(UserRole::User),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await?;
    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue(&state, user)?)))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(Json(issue(&state, user)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(
            validate_email(Some(" Rina@Example.com ".into())).unwrap(),
            "rina@example.com"
        );
    }

    #[test]
    fn test_bad_email() {
        assert!(validate_email(Some("rina".into())).is_err());
        assert!(validate_email(Some("@example.com".into())).is_err());
        assert!(validate_email(Some("rina@localhost".into())).is_err());
    }

    #[test]
    fn test_short_password() {
        assert!(validate_password(Some("abc".into())).is_err());
        assert_eq!(validate_password(Some("secret1".into())).unwrap(), "secret1");
    }

    #[test]
    fn test_hash_verifies() {
        let hash = hash_password("secret1").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"secret1", &parsed)
            .is_ok());
    }
}
