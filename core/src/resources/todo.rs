//! `/todos`.

use serde_json::{json, Value};

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
pub struct TodoClient {
    requester: Requester,
}

impl ResourceClient for TodoClient {
    fn requester(&self) -> &Requester {
        &self.requester
    }

    fn base_path(&self) -> &str {
        "/todos"
    }
}

impl TodoClient {
    pub fn new(requester: Requester) -> Self {
        Self { requester }
    }

    pub fn create_todo(&self, overrides: Option<&Value>) -> Result<ApiResponse, ApiError> {
        let payload = with_overrides(fake::todo(), overrides)?;
        self.post(&payload, "", CREATED)
    }

    pub fn list_todos(&self) -> Result<ApiResponse, ApiError> {
        self.get_all(&[], OK)
    }

    pub fn get_todo(&self, todo_id: u64) -> Result<ApiResponse, ApiError> {
        self.get_by_id(todo_id, OK)
    }

    pub fn todos_by_user(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        let user_id = user_id.to_string();
        self.get_all(&[("userId", user_id.as_str())], OK)
    }

    pub fn completed_todos(&self) -> Result<ApiResponse, ApiError> {
        self.get_all(&[("completed", "true")], OK)
    }

    pub fn pending_todos(&self) -> Result<ApiResponse, ApiError> {
        self.get_all(&[("completed", "false")], OK)
    }

    pub fn update_todo(&self, todo_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.put(todo_id, data, OK)
    }

    pub fn patch_todo(&self, todo_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.patch(todo_id, data, OK)
    }

    /// PATCH `{completed: true}`.
    pub fn complete_todo(&self, todo_id: u64) -> Result<ApiResponse, ApiError> {
        self.patch(todo_id, &json!({ "completed": true }), OK)
    }

    pub fn delete_todo(&self, todo_id: u64) -> Result<ApiResponse, ApiError> {
        self.delete(todo_id, OK)
    }
}

impl ResourceValidator for TodoClient {
    const NAME: &'static str = "todo";

    fn validate_structure(todo: &Value) -> Result<(), ApiError> {
        assert::require_fields(todo, &["id", "userId", "title", "completed"])?;
        assert::expect_bool(todo, "completed")
    }

    fn schema() -> &'static CompiledSchema {
        &schemas::TODO
    }

    fn list_schema() -> &'static CompiledSchema {
        &schemas::TODOS
    }
}
