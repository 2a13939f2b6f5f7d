use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::UserProfile;

/// Read access to user profiles. The default implementation is an in-memory
/// table; a database-backed store only needs to implement this trait.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<UserProfile>;
}

#[derive(Default, Clone)]
pub struct InMemoryProfileStore(Arc<HashMap<String, UserProfile>>);

impl InMemoryProfileStore {
    pub fn new(profiles: impl IntoIterator<Item = (String, UserProfile)>) -> Self {
        Self(Arc::new(profiles.into_iter().collect()))
    }

    /// The illustrative dataset served by `users://{user_id}/profile`.
    pub fn seeded() -> Self {
        Self::new([
            (
                "1".to_string(),
                UserProfile { name: "John Doe".into(), email: "john@example.com".into() },
            ),
            (
                "2".to_string(),
                UserProfile { name: "Jane Smith".into(), email: "jane@example.com".into() },
            ),
        ])
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.0.get(user_id).cloned()
    }
}
