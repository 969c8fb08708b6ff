use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Advisory presence flag. Flipped on sign-in and logout, never consulted by the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    #[default]
    Inactive,
}

/// User record in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never exposed in JSON
    pub photo: Option<String>,
    pub status: UserStatus,
}

/// Fields needed to insert a user; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub photo: Option<String>,
}
