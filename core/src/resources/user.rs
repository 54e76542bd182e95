//! `/users` and its nested posts, albums and todos.

use serde_json::Value;

use crate::assert;
use crate::client::{Requester, ResourceClient};
use crate::error::ApiError;
use crate::fake;
use crate::http::ApiResponse;
use crate::resources::{with_overrides, ResourceValidator};
use crate::schema::CompiledSchema;
use crate::schemas;
use crate::status::{CREATED, OK};

#[derive(Clone)]
pub struct UserClient {
    requester: Requester,
}

impl ResourceClient for UserClient {
    fn requester(&self) -> &Requester {
        &self.requester
    }

    fn base_path(&self) -> &str {
        "/users"
    }
}

impl UserClient {
    pub fn new(requester: Requester) -> Self {
        Self { requester }
    }

    /// POST a generated user with `overrides` laid over it.
    pub fn create_user(&self, overrides: Option<&Value>) -> Result<ApiResponse, ApiError> {
        let payload = with_overrides(fake::user(), overrides)?;
        self.post(&payload, "", CREATED)
    }

    pub fn list_users(&self) -> Result<ApiResponse, ApiError> {
        self.get_all(&[], OK)
    }

    pub fn get_user(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        self.get_by_id(user_id, OK)
    }

    /// Full replacement (PUT).
    pub fn update_user(&self, user_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.put(user_id, data, OK)
    }

    /// Partial update (PATCH).
    pub fn patch_user(&self, user_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.patch(user_id, data, OK)
    }

    pub fn delete_user(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        self.delete(user_id, OK)
    }

    pub fn user_posts(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/{user_id}/posts"), OK)
    }

    pub fn user_albums(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/{user_id}/albums"), OK)
    }

    pub fn user_todos(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/{user_id}/todos"), OK)
    }
}

impl ResourceValidator for UserClient {
    const NAME: &'static str = "user";

    fn validate_structure(user: &Value) -> Result<(), ApiError> {
        assert::require_fields(user, &["id", "name", "username", "email"])?;
        assert::expect_email(user, "email")
    }

    fn schema() -> &'static CompiledSchema {
        &schemas::USER
    }

    fn list_schema() -> &'static CompiledSchema {
        &schemas::USERS
    }
}
