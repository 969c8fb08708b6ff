use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LogoutRequest, MessageResponse, RegisterRequest,
            SigninRequest, SigninResponse, UserResponse,
        },
        extractors::AuthUser,
        services::{AuthService, Registration},
    },
    error::AppError,
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/signin", post(signin))
        .route("/auth/forgotPassword", post(forgot_password))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/user", get(get_user))
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    auth.register(Registration {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        photo: payload.photo,
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

#[instrument(skip(auth, payload))]
pub async fn signin(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<SigninRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let token = auth.signin(&payload.email, &payload.password).await?;
    Ok(Json(SigninResponse {
        message: "User signed in successfully",
        token,
    }))
}

/// Resets the password for an email without proving ownership of the account.
#[instrument(skip(auth, payload))]
pub async fn forgot_password(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.forgot_password(&payload.email, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

#[instrument(skip(auth, payload))]
pub async fn logout(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<LogoutRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.logout(&payload.email).await?;
    Ok(Json(MessageResponse {
        message: "User logged out successfully",
    }))
}

#[instrument(skip(auth))]
pub async fn get_user(
    State(auth): State<AuthService>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth.current_user(user_id).await?;
    Ok(Json(UserResponse { user }))
}
