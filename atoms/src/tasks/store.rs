use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{Task, UpdateTaskPayload};
use crate::error::TaskError;

/// GSI keyed by USER#{owner_id} so a user's tasks can be listed without
/// scanning. Projects all attributes.
pub const OWNER_INDEX: &str = "GSI1";

/// Durable task storage. No validation here - the service layer owns that.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task owned by `owner_id` with `completed = false`.
    async fn create(&self, owner_id: &str, description: &str) -> Result<Task, TaskError>;

    /// Global lookup by id, regardless of owner.
    async fn get(&self, task_id: &str) -> Result<Option<Task>, TaskError>;

    /// All tasks owned by `owner_id`, in no particular order.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>, TaskError>;

    /// Apply the present fields of `patch` and bump `updated_at`. Fails
    /// with `NotFound` if the task no longer exists.
    async fn update(&self, task_id: &str, patch: &UpdateTaskPayload) -> Result<Task, TaskError>;

    /// Remove the task. Deleting an unknown id is a no-op.
    async fn delete(&self, task_id: &str) -> Result<(), TaskError>;
}

/// Production store backed by the single-table DynamoDB layout:
/// PK = SK = TASK#{id}, GSI1PK = USER#{owner_id}, GSI1SK = TASK#{id}.
#[derive(Clone)]
pub struct DynamoTaskStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoTaskStore {
    pub fn new(client: DynamoClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

/// Fixed-width RFC 3339 UTC stamp (microseconds) so lexicographic order is
/// chronological order.
fn now_utc() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

fn task_from_item(task_id: &str, item: &HashMap<String, AttributeValue>) -> Task {
    Task {
        task_id: task_id.to_string(),
        owner_id: item
            .get("owner_id")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        description: item
            .get("description")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        completed: item
            .get("completed")
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(false),
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        updated_at: item
            .get("updated_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl TaskStore for DynamoTaskStore {
    async fn create(&self, owner_id: &str, description: &str) -> Result<Task, TaskError> {
        let task_id = uuid::Uuid::new_v4().to_string();
        let now = now_utc();
        let pk = format!("TASK#{}", task_id);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(pk.clone()))
            .item("SK", AttributeValue::S(pk))
            .item("GSI1PK", AttributeValue::S(format!("USER#{}", owner_id)))
            .item("GSI1SK", AttributeValue::S(format!("TASK#{}", task_id)))
            .item("owner_id", AttributeValue::S(owner_id.to_string()))
            .item("description", AttributeValue::S(description.to_string()))
            .item("completed", AttributeValue::Bool(false))
            .item("created_at", AttributeValue::S(now.clone()))
            .item("updated_at", AttributeValue::S(now.clone()))
            .send()
            .await
            .map_err(|e| TaskError::Store(format!("DynamoDB put_item error: {}", e)))?;

        Ok(Task {
            task_id,
            owner_id: owner_id.to_string(),
            description: description.to_string(),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, TaskError> {
        let pk = format!("TASK#{}", task_id);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .send()
            .await
            .map_err(|e| TaskError::Store(format!("DynamoDB get_item error: {}", e)))?;

        Ok(result.item().map(|item| task_from_item(task_id, item)))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>, TaskError> {
        let pk = format!("USER#{}", owner_id);

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(OWNER_INDEX)
            .key_condition_expression("GSI1PK = :pk AND begins_with(GSI1SK, :sk_prefix)")
            .expression_attribute_values(":pk", AttributeValue::S(pk))
            .expression_attribute_values(":sk_prefix", AttributeValue::S("TASK#".to_string()))
            .send()
            .await
            .map_err(|e| TaskError::Store(format!("DynamoDB query error: {}", e)))?;

        let mut tasks = Vec::new();
        for item in result.items() {
            if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
                if let Some(task_id) = sk.strip_prefix("TASK#") {
                    tasks.push(task_from_item(task_id, item));
                }
            }
        }

        Ok(tasks)
    }

    async fn update(&self, task_id: &str, patch: &UpdateTaskPayload) -> Result<Task, TaskError> {
        let pk = format!("TASK#{}", task_id);

        let mut update_expr = vec!["#updated_at = :updated_at"];
        let mut expr_names = HashMap::new();
        let mut expr_values = HashMap::new();
        expr_names.insert("#updated_at".to_string(), "updated_at".to_string());
        expr_values.insert(":updated_at".to_string(), AttributeValue::S(now_utc()));

        if let Some(description) = &patch.description {
            update_expr.push("#description = :description");
            expr_names.insert("#description".to_string(), "description".to_string());
            expr_values.insert(
                ":description".to_string(),
                AttributeValue::S(description.clone()),
            );
        }

        if let Some(completed) = patch.completed {
            update_expr.push("#completed = :completed");
            expr_names.insert("#completed".to_string(), "completed".to_string());
            expr_values.insert(":completed".to_string(), AttributeValue::Bool(completed));
        }

        let mut builder = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .update_expression(format!("SET {}", update_expr.join(", ")))
            // update_item upserts by default; a concurrent delete must not
            // resurrect the task as a partial item
            .condition_expression("attribute_exists(PK)");

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k, v);
        }

        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k, v);
        }

        builder.send().await.map_err(|e| {
            let service_error = e.into_service_error();
            if service_error.is_conditional_check_failed_exception() {
                TaskError::NotFound
            } else {
                TaskError::Store(format!("DynamoDB update_item error: {}", service_error))
            }
        })?;

        match self.get(task_id).await? {
            Some(task) => Ok(task),
            None => Err(TaskError::NotFound),
        }
    }

    async fn delete(&self, task_id: &str) -> Result<(), TaskError> {
        let pk = format!("TASK#{}", task_id);

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .send()
            .await
            .map_err(|e| TaskError::Store(format!("DynamoDB delete_item error: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryTaskStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::TaskStore;
    use crate::error::TaskError;
    use crate::tasks::model::{Task, UpdateTaskPayload};

    /// In-memory store for the service tests. Timestamps come from a
    /// logical clock so creation order is never ambiguous.
    pub(crate) struct MemoryTaskStore {
        tasks: Mutex<HashMap<String, Task>>,
        clock: AtomicU64,
    }

    impl MemoryTaskStore {
        pub(crate) fn new() -> Self {
            Self {
                tasks: Mutex::new(HashMap::new()),
                clock: AtomicU64::new(0),
            }
        }

        fn next_stamp(&self) -> String {
            let tick = self.clock.fetch_add(1, Ordering::SeqCst);
            format!("2026-01-01T00:{:02}:{:02}.000000Z", tick / 60, tick % 60)
        }

        /// Insert a task as-is, bypassing the store contract.
        pub(crate) fn seed(&self, task: Task) {
            self.tasks.lock().unwrap().insert(task.task_id.clone(), task);
        }
    }

    #[async_trait]
    impl TaskStore for MemoryTaskStore {
        async fn create(&self, owner_id: &str, description: &str) -> Result<Task, TaskError> {
            let now = self.next_stamp();
            let task = Task {
                task_id: uuid::Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                description: description.to_string(),
                completed: false,
                created_at: now.clone(),
                updated_at: now,
            };
            self.tasks
                .lock()
                .unwrap()
                .insert(task.task_id.clone(), task.clone());
            Ok(task)
        }

        async fn get(&self, task_id: &str) -> Result<Option<Task>, TaskError> {
            Ok(self.tasks.lock().unwrap().get(task_id).cloned())
        }

        async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>, TaskError> {
            Ok(self
                .tasks
                .lock()
                .unwrap()
                .values()
                .filter(|task| task.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn update(
            &self,
            task_id: &str,
            patch: &UpdateTaskPayload,
        ) -> Result<Task, TaskError> {
            let now = self.next_stamp();
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks.get_mut(task_id).ok_or(TaskError::NotFound)?;
            if let Some(description) = &patch.description {
                task.description = description.clone();
            }
            if let Some(completed) = patch.completed {
                task.completed = completed;
            }
            task.updated_at = now;
            Ok(task.clone())
        }

        async fn delete(&self, task_id: &str) -> Result<(), TaskError> {
            self.tasks.lock().unwrap().remove(task_id);
            Ok(())
        }
    }
}
