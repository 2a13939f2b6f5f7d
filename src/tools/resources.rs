use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::core::error::HostError;
use crate::core::resource::Resource;
use crate::core::uri::UriParams;
use crate::infra::store::ProfileStore;

pub const APP_NAME: &str = "NextJS-FastAPI App";
pub const APP_VERSION: &str = "1.0.0";

/// `config://app`: static application info.
#[derive(Clone)]
pub struct AppConfigResource {
    environment: String,
}

impl AppConfigResource {
    pub fn new(environment: impl Into<String>) -> Self {
        Self { environment: environment.into() }
    }
}

#[derive(Serialize)]
struct AppInfo<'a> {
    name: &'a str,
    version: &'a str,
    environment: &'a str,
}

#[async_trait]
impl Resource for AppConfigResource {
    fn uri(&self) -> &'static str {
        "config://app"
    }
    fn name(&self) -> &'static str {
        "get_app_config"
    }
    fn description(&self) -> &'static str {
        "Get application configuration."
    }
    async fn read(&self, _uri: &str, _params: &UriParams) -> Result<String, HostError> {
        let info = AppInfo { name: APP_NAME, version: APP_VERSION, environment: &self.environment };
        Ok(serde_json::to_string_pretty(&info)?)
    }
}

/// `users://{user_id}/profile`: profile lookup. An unknown id yields an
/// error-shaped JSON body, not an error.
#[derive(Clone)]
pub struct UserProfileResource {
    store: Arc<dyn ProfileStore>,
}

impl UserProfileResource {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Resource for UserProfileResource {
    fn uri(&self) -> &'static str {
        "users://{user_id}/profile"
    }
    fn name(&self) -> &'static str {
        "get_user_profile"
    }
    fn description(&self) -> &'static str {
        "Get user profile data"
    }
    async fn read(&self, _uri: &str, params: &UriParams) -> Result<String, HostError> {
        let user_id = params
            .get("user_id")
            .ok_or_else(|| HostError::InvalidArguments("missing user_id".into()))?;
        match self.store.get(user_id).await {
            Some(profile) => Ok(serde_json::to_string_pretty(&profile)?),
            None => Ok(json!({ "error": "User not found" }).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::InMemoryProfileStore;
    use serde_json::Value;

    fn params(id: &str) -> UriParams {
        UriParams::from([("user_id".to_string(), id.to_string())])
    }

    #[tokio::test]
    async fn app_config_echoes_environment() {
        let r = AppConfigResource::new("staging");
        let body = r.read("config://app", &UriParams::new()).await.unwrap();
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v, json!({"name": APP_NAME, "version": "1.0.0", "environment": "staging"}));
        assert!(body.contains("\n  \"name\""), "expected pretty output: {body}");
    }

    #[tokio::test]
    async fn known_profile_is_returned() {
        let r = UserProfileResource::new(Arc::new(InMemoryProfileStore::seeded()));
        let body = r.read("users://1/profile", &params("1")).await.unwrap();
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v, json!({"name": "John Doe", "email": "john@example.com"}));
    }

    #[tokio::test]
    async fn unknown_profile_is_error_shaped_body() {
        let r = UserProfileResource::new(Arc::new(InMemoryProfileStore::seeded()));
        let body = r.read("users://99/profile", &params("99")).await.unwrap();
        assert_eq!(body, r#"{"error":"User not found"}"#);
    }
}
