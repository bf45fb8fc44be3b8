use crate::auth::ProfileSource;
use crate::core::error::AuthError;
use crate::models::user::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub const PROFILE_PATH: &str = "/api/auth/profile";

/// HTTP client for the backend profile endpoint
pub struct ProfileClient {
    client: reqwest::Client,
    profile_url: String,
}

/// Profile payload, either bare or wrapped in `{"user": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileResponse {
    Wrapped { user: User },
    Bare(User),
}

impl ProfileResponse {
    fn into_user(self) -> User {
        match self {
            ProfileResponse::Wrapped { user } | ProfileResponse::Bare(user) => user,
        }
    }
}

impl ProfileClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            profile_url: profile_url(base_url),
        })
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }
}

fn profile_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), PROFILE_PATH)
}

/// Decode a profile body
pub fn parse_profile(body: &str) -> Result<User, AuthError> {
    let response: ProfileResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Decode(e.to_string()))?;
    let user = response.into_user();

    if user.id.is_empty() {
        return Err(AuthError::Decode("profile has an empty id".to_string()));
    }

    Ok(user)
}

#[async_trait]
impl ProfileSource for ProfileClient {
    async fn fetch_profile(&self, token: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .get(&self.profile_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_profile(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_client_creation() {
        let client = ProfileClient::new("http://localhost:5000/", Duration::from_secs(30));
        assert!(client.is_ok());
        assert_eq!(
            client.unwrap().profile_url(),
            "http://localhost:5000/api/auth/profile"
        );
    }

    #[test]
    fn test_parse_bare_profile() {
        let user = parse_profile(r#"{"id":"u-1","display_name":"Alice","credits":10}"#).unwrap();
        assert_eq!(user, User::new("u-1", "Alice", 10));
    }

    #[test]
    fn test_parse_wrapped_profile() {
        let user =
            parse_profile(r#"{"success":true,"user":{"id":"u-2","nickname":"Bob","credits":3}}"#)
                .unwrap();
        assert_eq!(user.display_name, "Bob");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_profile("<html>"), Err(AuthError::Decode(_))));
        assert!(matches!(
            parse_profile(r#"{"id":"","display_name":"X"}"#),
            Err(AuthError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // bind an ephemeral port, then free it so nothing is listening there
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let base_url = format!("http://127.0.0.1:{port}");
        let client = ProfileClient::new(&base_url, Duration::from_secs(2)).unwrap();
        let result = client.fetch_profile("token").await;
        assert!(matches!(result, Err(AuthError::Transport(_))));
    }
}
