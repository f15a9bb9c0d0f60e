pub mod auth;

use std::env;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;

/// Shared AWS clients and configuration, built once at cold start and
/// reused across invocations.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub cognito_client: CognitoClient,
    pub table_name: String,
}

impl AppState {
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        AppState {
            dynamo_client: DynamoClient::new(&config),
            cognito_client: CognitoClient::new(&config),
            table_name: env::var("TABLE_NAME").unwrap_or_else(|_| "ticked".to_string()),
        }
    }
}
