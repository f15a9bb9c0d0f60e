use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use lambda_http::http::header::HeaderValue;
use lambda_http::{http::StatusCode, Body, Response};

/// Session cookie carrying the Cognito access token. Issued by the
/// external login flow; this service only validates it.
pub const ACCESS_TOKEN_COOKIE: &str = "ticked_access_token";

const ALLOWED_ORIGINS: &[&str] = &["https://app.ticked.io", "http://localhost:5173"];

/// Identity established for the current request.
pub struct AuthContext {
    pub user_id: String,
}

/// Pull a single cookie value out of a Cookie header.
pub fn get_cookie(cookie_header: Option<&str>, name: &str) -> Option<String> {
    for pair in cookie_header?.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Echo the request origin when it is on the allow-list, otherwise fall
/// back to the production origin.
pub fn get_cors_origin(request_origin: Option<&str>) -> String {
    match request_origin {
        Some(origin) if ALLOWED_ORIGINS.contains(&origin) => origin.to_string(),
        _ => ALLOWED_ORIGINS[0].to_string(),
    }
}

/// Validate the access-token cookie against Cognito and resolve the
/// caller's identity. On failure returns the 401 response to send back,
/// so no handler runs without an authenticated user.
pub async fn authenticate_cookie_request(
    cognito_client: &CognitoClient,
    cookie_header: Option<&str>,
) -> Result<AuthContext, Response<Body>> {
    let Some(access_token) = get_cookie(cookie_header, ACCESS_TOKEN_COOKIE) else {
        return Err(unauthorized("Not authenticated"));
    };

    let user = match cognito_client
        .get_user()
        .access_token(access_token)
        .send()
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Access token rejected: {}", e);
            return Err(unauthorized("Session expired"));
        }
    };

    // The sub attribute is the stable user id; usernames can be aliased
    let Some(user_id) = user
        .user_attributes()
        .iter()
        .find(|attr| attr.name() == "sub")
        .and_then(|attr| attr.value())
        .map(|sub| sub.to_string())
    else {
        tracing::warn!("Cognito user record has no sub attribute");
        return Err(unauthorized("Session expired"));
    };

    Ok(AuthContext { user_id })
}

fn unauthorized(message: &str) -> Response<Body> {
    let body = serde_json::json!({ "error": message }).to_string();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
        .headers_mut()
        .insert("Content-Type", HeaderValue::from_static("application/json"));
    response
}
