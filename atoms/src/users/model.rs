use serde::{Deserialize, Serialize};

/// Profile of a signed-in user. Records are written by the external
/// signup flow; this service only reads them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "id")]
    pub user_id: String,
    #[serde(rename = "name")]
    pub user_name: String,
    #[serde(rename = "email")]
    pub user_email: String,
    #[serde(rename = "created_at")]
    pub user_created_at: String,
}
