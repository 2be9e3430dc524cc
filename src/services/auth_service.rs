use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
    ActiveValue::NotSet,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, SessionResponse},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::session::SessionId,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{check_login, check_registration},
};

const TOKEN_TTL_HOURS: i64 = 24;

/// Turns unique violations into field-level messages.
pub fn registration_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains("users_username_key") {
                AppError::validation("That username is already taken")
            } else if detail.contains("users_email_key") {
                AppError::validation("That email is already registered")
            } else {
                AppError::validation("Something went wrong, please try again")
            }
        }
        _ => {
            tracing::error!(error = %err, "user insert failed");
            AppError::validation("Something went wrong, please try again")
        }
    }
}

pub fn issue_token(user: &User, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        is_admin: user.is_admin,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let new_user = check_registration(&payload)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(new_user.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = UserActive {
        id: NotSet,
        uuid: Set(Uuid::new_v4()),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        username: Set(new_user.username),
        email: Set(new_user.email),
        password_hash: Set(password_hash),
        is_admin: Set(false),
        address: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(registration_error)?;

    let user = User::from(user);
    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let credentials = check_login(&payload)?;

    let user = Users::find()
        .filter(UserCol::Username.eq(credentials.username.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::validation("Invalid username/password"))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(credentials.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::validation("Invalid username/password"));
    }

    let user = User::from(user);
    let token = issue_token(&user, &state.jwt_secret)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

/// Drops everything stored for the session, including its cart.
pub async fn logout(
    state: &AppState,
    session: SessionId,
) -> AppResult<ApiResponse<SessionResponse>> {
    state.sessions.clear(session.0).await?;
    tracing::debug!(session_id = %session.0, "session cleared");
    Ok(ApiResponse::success(
        "Logged out",
        SessionResponse {
            session_id: session.0,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    fn user() -> User {
        User {
            id: 42,
            uuid: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            is_admin: false,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_decodes_to_same_user() {
        let token = issue_token(&user(), "test-secret").unwrap();
        let auth = decode_token(&token, "test-secret").unwrap();
        assert_eq!(auth.user_id, 42);
        assert_eq!(auth.username, "ada");
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = issue_token(&user(), "test-secret").unwrap();
        assert!(matches!(
            decode_token(&token, "other-secret"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn non_unique_failures_get_generic_message() {
        match registration_error(DbErr::Custom("boom".into())) {
            AppError::Validation(messages) => {
                assert_eq!(messages, vec!["Something went wrong, please try again"])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
