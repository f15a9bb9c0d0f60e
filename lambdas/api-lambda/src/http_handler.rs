use std::sync::Arc;

use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use ticked_atoms::tasks::{self, DynamoTaskStore};
use ticked_atoms::users;
use ticked_shared::{auth, AppState};

fn with_cors_headers(mut resp: Response<Body>, request_origin: Option<&str>) -> Response<Body> {
    let cors_origin = auth::get_cors_origin(request_origin);

    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(&cors_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("https://app.ticked.io")),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Cookie"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    request_origin: Option<&str>,
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(r, request_origin))
}

/// Main Lambda handler - authenticates the session cookie, then routes to
/// the task and user endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    tracing::info!("API request - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, request_origin));
    }

    // Public liveness probe
    if path == "/health-check" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(
                serde_json::json!({
                    "status": "ok",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })
                .to_string()
                .into(),
            )
            .map_err(Box::new)?;
        return finalize_response(Ok(resp), request_origin);
    }

    // Everything below requires an authenticated session (cookie auth)
    let cookie_header = event.headers().get("Cookie").and_then(|v| v.to_str().ok());
    let auth_ctx =
        match auth::authenticate_cookie_request(&state.cognito_client, cookie_header).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(with_cors_headers(resp, request_origin)),
        };
    let user_id = auth_ctx.user_id;

    if path.starts_with("/tasks") {
        let store = DynamoTaskStore::new(state.dynamo_client.clone(), state.table_name.clone());
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /tasks - ordered task list
            (&Method::GET, ["tasks"]) => tasks::list_tasks_handler(&store, &user_id).await,
            // POST /tasks - create task, respond with refreshed list
            (&Method::POST, ["tasks"]) => tasks::create_task_handler(&store, &user_id, body).await,
            // PATCH /tasks/{id} - update description and/or completed
            (&Method::PATCH, ["tasks", task_id]) => {
                tasks::update_task_handler(&store, &user_id, task_id, body).await
            }
            // DELETE /tasks/{id} - delete task
            (&Method::DELETE, ["tasks", task_id]) => {
                tasks::delete_task_handler(&store, &user_id, task_id).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    if path.starts_with("/users") {
        let resp = match (method, path) {
            (&Method::GET, "/users/me") => {
                users::get_user(&state.dynamo_client, &state.table_name, &user_id).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    tracing::warn!("No route matched - Method: {} Path: {}", method, path);
    finalize_response(not_found(), request_origin)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}
