//! `/posts` and its nested comments.

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
pub struct PostClient {
    requester: Requester,
}

impl ResourceClient for PostClient {
    fn requester(&self) -> &Requester {
        &self.requester
    }

    fn base_path(&self) -> &str {
        "/posts"
    }
}

impl PostClient {
    pub fn new(requester: Requester) -> Self {
        Self { requester }
    }

    pub fn create_post(&self, overrides: Option<&Value>) -> Result<ApiResponse, ApiError> {
        let payload = with_overrides(fake::post(), overrides)?;
        self.post(&payload, "", CREATED)
    }

    pub fn list_posts(&self) -> Result<ApiResponse, ApiError> {
        self.get_all(&[], OK)
    }

    pub fn get_post(&self, post_id: u64) -> Result<ApiResponse, ApiError> {
        self.get_by_id(post_id, OK)
    }

    pub fn posts_by_user(&self, user_id: u64) -> Result<ApiResponse, ApiError> {
        let user_id = user_id.to_string();
        self.get_all(&[("userId", user_id.as_str())], OK)
    }

    pub fn update_post(&self, post_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.put(post_id, data, OK)
    }

    pub fn patch_post(&self, post_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.patch(post_id, data, OK)
    }

    pub fn delete_post(&self, post_id: u64) -> Result<ApiResponse, ApiError> {
        self.delete(post_id, OK)
    }

    pub fn post_comments(&self, post_id: u64) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/{post_id}/comments"), OK)
    }
}

impl ResourceValidator for PostClient {
    const NAME: &'static str = "post";

    fn validate_structure(post: &Value) -> Result<(), ApiError> {
        assert::require_fields(post, &["id", "title", "body", "userId"])?;
        assert::expect_string(post, "title")?;
        assert::expect_string(post, "body")?;
        assert::expect_number(post, "userId")
    }

    fn schema() -> &'static CompiledSchema {
        &schemas::POST
    }

    fn list_schema() -> &'static CompiledSchema {
        &schemas::POSTS
    }
}
