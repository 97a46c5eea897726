use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{
        Claims, LoginRequest, LoginResponse, MeResponse, SignupRequest, UpdateProfileRequest,
        UserProfile,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const SESSION_HOURS: i64 = 24;

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn issue_token(user: &User, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(SESSION_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn signup(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<UserProfile>> {
    let name = required(payload.name, "name")?;
    let email = required(payload.email, "email")?;
    let password = required(payload.password, "password")?;

    let password = hash_password(&password)?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password: Some(password),
        ..Default::default()
    };

    // Uniqueness is checked inside the same write cycle as the append.
    let created = state
        .store
        .modify(|users: &mut Vec<User>| {
            if users.iter().any(|u| u.email == user.email) {
                return None;
            }
            users.push(user.clone());
            Some(user)
        })
        .await?;
    let user = created.ok_or_else(|| AppError::BadRequest("User already exists".into()))?;

    tracing::info!(user_id = %user.id, "user registered");
    let is_admin = state.config.is_admin_email(&user.email);
    Ok(ApiResponse::success(
        "User created",
        UserProfile::new(user, is_admin),
        Some(Meta::empty()),
    ))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let email = required(payload.email, "email")?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("password is required".into()))?;

    let user = state
        .store
        .list::<User>()
        .await
        .into_iter()
        .find(|u| u.email == email)
        .ok_or(AppError::Unauthorized)?;

    let valid = user
        .password
        .as_deref()
        .is_some_and(|hash| verify_password(&password, hash));
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(&user, &state.config.jwt_secret)?;
    tracing::info!(user_id = %user.id, "user logged in");

    let is_admin = state.config.is_admin_email(&user.email);
    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token,
            user: UserProfile::new(user, is_admin),
        },
        Some(Meta::empty()),
    ))
}

pub async fn me(state: &AppState, caller: &AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    let user = state
        .store
        .get::<User>(&caller.user_id)
        .await
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        MeResponse {
            user: UserProfile::new(user, caller.is_admin(&state.config)),
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_me(
    state: &AppState,
    caller: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<MeResponse>> {
    let user = state
        .store
        .update(&caller.user_id, |user: &mut User| payload.apply(user))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Profile updated",
        MeResponse {
            user: UserProfile::new(user, caller.is_admin(&state.config)),
        },
        Some(Meta::empty()),
    ))
}
