use super::model::{Task, UpdateTaskPayload};
use super::store::TaskStore;
use crate::error::TaskError;

pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Trim and validate a description. Returns the trimmed value so callers
/// persist exactly what passed validation.
fn validate_description(description: &str) -> Result<&str, TaskError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(TaskError::validation(
            "description",
            "The description field is required.",
        ));
    }
    // Characters, not bytes - multi-byte descriptions get the full limit
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(TaskError::validation(
            "description",
            format!(
                "The description field must not be greater than {} characters.",
                MAX_DESCRIPTION_CHARS
            ),
        ));
    }
    Ok(trimmed)
}

/// Incomplete tasks first, newest first within each group. Ties on
/// created_at fall back to task_id descending so the order is total.
fn sort_task_list(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.task_id.cmp(&a.task_id))
    });
}

/// Fetch the task and check it belongs to `user_id`. Unknown id is
/// not-found; someone else's task is forbidden, with nothing disclosed.
async fn authorize_task(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: &str,
) -> Result<Task, TaskError> {
    let task = store.get(task_id).await?.ok_or(TaskError::NotFound)?;
    if task.owner_id != user_id {
        return Err(TaskError::Forbidden);
    }
    Ok(task)
}

/// All tasks owned by `user_id` in display order.
pub async fn list_tasks(store: &dyn TaskStore, user_id: &str) -> Result<Vec<Task>, TaskError> {
    let mut tasks = store.list_by_owner(user_id).await?;
    sort_task_list(&mut tasks);
    Ok(tasks)
}

/// Create a task owned by `user_id` and return the refreshed ordered list.
pub async fn create_task(
    store: &dyn TaskStore,
    user_id: &str,
    description: &str,
) -> Result<Vec<Task>, TaskError> {
    let description = validate_description(description)?;
    store.create(user_id, description).await?;
    list_tasks(store, user_id).await
}

/// Apply a partial update to one of `user_id`'s own tasks and return the
/// refreshed ordered list.
pub async fn update_task(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: &str,
    mut patch: UpdateTaskPayload,
) -> Result<Vec<Task>, TaskError> {
    authorize_task(store, user_id, task_id).await?;
    if let Some(description) = patch.description.take() {
        patch.description = Some(validate_description(&description)?.to_string());
    }
    store.update(task_id, &patch).await?;
    list_tasks(store, user_id).await
}

/// Delete one of `user_id`'s own tasks and return the refreshed ordered
/// list.
pub async fn delete_task(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: &str,
) -> Result<Vec<Task>, TaskError> {
    authorize_task(store, user_id, task_id).await?;
    store.delete(task_id).await?;
    list_tasks(store, user_id).await
}
