// Re-export model types, store, and handlers
pub mod http;
pub mod model;
pub mod service;
pub mod store;

pub use http::*;
pub use model::{CreateTaskPayload, Task, UpdateTaskPayload};
pub use store::{DynamoTaskStore, TaskStore};
