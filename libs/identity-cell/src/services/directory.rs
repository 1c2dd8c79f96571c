use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{IdentityError, UserAccount, UserSummary};

/// Read-only view of the user collection.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserAccount>, IdentityError>;

    async fn list_usernames(&self) -> Result<Vec<UserSummary>, IdentityError>;
}

pub struct SupabaseUserDirectory {
    supabase: SupabaseClient,
}

impl SupabaseUserDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl UserDirectory for SupabaseUserDirectory {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserAccount>, IdentityError> {
        debug!("Resolving user {}", user_id);

        let path = format!(
            "/rest/v1/users?id=eq.{}&select=id,username,password_hash",
            urlencoding::encode(user_id)
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| IdentityError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => {
                let user: UserAccount = serde_json::from_value(row)
                    .map_err(|e| IdentityError::DatabaseError(format!("Failed to parse user: {}", e)))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn list_usernames(&self) -> Result<Vec<UserSummary>, IdentityError> {
        let result: Vec<UserSummary> = self.supabase
            .fetch_all("/rest/v1/users?select=username&order=username.asc,id.asc")
            .await
            .map_err(|e| IdentityError::DatabaseError(e.to_string()))?;

        debug!("Listed {} usernames", result.len());
        Ok(result)
    }
}
