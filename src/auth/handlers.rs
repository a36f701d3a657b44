use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest, MeResponse, PublicUser, RefreshRequest},
        repo_types::User,
        services::{hash_password, is_valid_email, verify_password, AuthUser, JwtKeys, MIN_PASSWORD_LEN},
    },
    error::{ok, ApiResponse, AppError},
    profile::Profile,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn normalized_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    Ok(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let email = normalized_email(&payload.email)?;
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::BadRequest("Password too short".into()));
    }

    let hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal("Failed to register", e))?;

    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|e| AppError::internal("Failed to register", e))?;
    let user = User::create(&mut tx, &email, &hash)
        .await
        .map_err(|e| AppError::internal("Failed to register", e))?
        .ok_or_else(|| {
            warn!(email = %email, "email already registered");
            AppError::Conflict("Email already registered".into())
        })?;
    Profile::create_empty(&mut tx, user.id)
        .await
        .map_err(|e| AppError::internal("Failed to register", e))?;
    tx.commit()
        .await
        .map_err(|e| AppError::internal("Failed to register", e))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let tokens = JwtKeys::from_ref(&state).issue(user.into())?;
    Ok((StatusCode::CREATED, ok(tokens)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let email = normalized_email(&payload.email)?;

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(|e| AppError::internal("Failed to log in", e))?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            AppError::Unauthorized("Invalid credentials".into())
        })?;

    let matches = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal("Failed to log in", e))?;
    if !matches {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(ok(JwtKeys::from_ref(&state).issue(user.into())?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("Invalid refresh token".into())
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| AppError::internal("Failed to refresh token", e))?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    Ok(ok(keys.issue(user.into())?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load user", e))?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    let profile = Profile::find(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load user", e))?;

    Ok(ok(MeResponse {
        user: PublicUser::from(user),
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalized_email("  Sam@Example.COM ").unwrap(), "sam@example.com");
        assert!(matches!(normalized_email("nope"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn me_response_flattens_user() {
        let id = Uuid::new_v4();
        let response = MeResponse {
            user: PublicUser {
                id,
                email: "test@example.com".into(),
            },
            profile: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json["id"], id.to_string());
        assert!(json["profile"].is_null());
    }
}
