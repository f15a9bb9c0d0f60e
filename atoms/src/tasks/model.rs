use serde::{Deserialize, Serialize};

/// Task domain model - a single to-do item owned by exactly one user
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Task {
    /// Stored as "task_id"; the FE contract calls it "id"
    #[serde(rename = "id")]
    pub task_id: String,

    /// Cognito subject of the creating user; immutable after creation
    #[serde(rename = "user_id")]
    pub owner_id: String,

    pub description: String,
    pub completed: bool,

    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskPayload {
    pub description: String,
}

/// Explicit partial update - absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateTaskPayload {
    pub description: Option<String>,
    pub completed: Option<bool>,
}
