use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::{CreateTaskPayload, Task, UpdateTaskPayload};
use super::service;
use super::store::TaskStore;
use crate::error::TaskError;

/// GET /tasks - the user's tasks in display order
pub async fn list_tasks_handler(
    store: &dyn TaskStore,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::list_tasks(store, user_id).await {
        Ok(tasks) => task_list_response(&tasks),
        Err(err) => error_response(err),
    }
}

/// POST /tasks - create a task, respond with the refreshed list
pub async fn create_task_handler(
    store: &dyn TaskStore,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateTaskPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to parse create task payload: {}", e);
            return bad_request("Invalid request body");
        }
    };

    match service::create_task(store, user_id, &payload.description).await {
        Ok(tasks) => task_list_response(&tasks),
        Err(err) => error_response(err),
    }
}

/// PATCH /tasks/{id} - partial update, respond with the refreshed list
pub async fn update_task_handler(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: UpdateTaskPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to parse update task payload: {}", e);
            return bad_request("Invalid request body");
        }
    };

    match service::update_task(store, user_id, task_id, payload).await {
        Ok(tasks) => task_list_response(&tasks),
        Err(err) => error_response(err),
    }
}

/// DELETE /tasks/{id} - respond with the refreshed list
pub async fn delete_task_handler(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_task(store, user_id, task_id).await {
        Ok(tasks) => task_list_response(&tasks),
        Err(err) => error_response(err),
    }
}

fn task_list_response(tasks: &[Task]) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(tasks)?.into())
        .map_err(Box::new)?)
}

fn bad_request(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({ "error": message }).to_string().into())
        .map_err(Box::new)?)
}

fn error_response(err: TaskError) -> Result<Response<Body>, Error> {
    let (status, body) = match err {
        TaskError::Validation { field, message } => {
            // Field-keyed shape the client renders as inline form errors
            let mut errors = serde_json::Map::new();
            errors.insert(field.to_string(), serde_json::json!([message.clone()]));
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "message": message, "errors": errors }),
            )
        }
        TaskError::NotFound => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": "Task not found" }),
        ),
        TaskError::Forbidden => (
            StatusCode::FORBIDDEN,
            serde_json::json!({ "error": "Forbidden" }),
        ),
        TaskError::Store(message) => {
            tracing::error!("Task store failure: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "Internal server error" }),
            )
        }
    };

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::store::MemoryTaskStore;

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn validation_errors_map_to_422_with_field_errors() {
        let response = error_response(TaskError::validation(
            "description",
            "The description field is required.",
        ))
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(&response);
        assert_eq!(
            body["errors"]["description"][0],
            "The description field is required."
        );
    }

    #[test]
    fn not_found_and_forbidden_map_to_their_statuses() {
        let response = error_response(TaskError::NotFound).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(TaskError::Forbidden).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(&response)["error"], "Forbidden");
    }

    #[test]
    fn store_failures_map_to_500_without_leaking_details() {
        let response = error_response(TaskError::Store("table missing".to_string())).unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response)["error"], "Internal server error");
    }

    #[tokio::test]
    async fn create_rejects_malformed_json_with_400() {
        let store = MemoryTaskStore::new();

        let response = create_task_handler(&store, "u1", b"not json").await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_serializes_the_list_with_client_field_names() {
        let store = MemoryTaskStore::new();

        let response = create_task_handler(&store, "u1", br#"{"description":"Buy milk"}"#)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body[0]["description"], "Buy milk");
        assert_eq!(body[0]["user_id"], "u1");
        assert_eq!(body[0]["completed"], false);
        assert!(body[0]["id"].is_string());
        assert!(body[0]["created_at"].is_string());
        assert!(body[0]["updated_at"].is_string());
    }
}
