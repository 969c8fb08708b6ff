use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid, // subject
    pub iat: i64,      // issued at (unix seconds)
    pub exp: i64,      // expires at (unix seconds)
}
