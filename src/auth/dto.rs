use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub photo: Option<String>,
}

/// Request body for sign-in.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}
