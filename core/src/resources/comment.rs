//! `/comments`.

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
pub struct CommentClient {
    requester: Requester,
}

impl ResourceClient for CommentClient {
    fn requester(&self) -> &Requester {
        &self.requester
    }

    fn base_path(&self) -> &str {
        "/comments"
    }
}

impl CommentClient {
    pub fn new(requester: Requester) -> Self {
        Self { requester }
    }

    /// POST a generated comment under `post_id`; the parent id always wins
    /// over any `postId` in `overrides`.
    pub fn create_comment(&self, post_id: u64, overrides: Option<&Value>) -> Result<ApiResponse, ApiError> {
        let mut payload = with_overrides(fake::comment(), overrides)?;
        payload["postId"] = Value::from(post_id);
        self.post(&payload, "", CREATED)
    }

    pub fn list_comments(&self) -> Result<ApiResponse, ApiError> {
        self.get_all(&[], OK)
    }

    pub fn get_comment(&self, comment_id: u64) -> Result<ApiResponse, ApiError> {
        self.get_by_id(comment_id, OK)
    }

    pub fn comments_by_post(&self, post_id: u64) -> Result<ApiResponse, ApiError> {
        let post_id = post_id.to_string();
        self.get_all(&[("postId", post_id.as_str())], OK)
    }

    pub fn comments_by_email(&self, email: &str) -> Result<ApiResponse, ApiError> {
        self.get_all(&[("email", email)], OK)
    }

    pub fn update_comment(&self, comment_id: u64, data: &Value) -> Result<ApiResponse, ApiError> {
        self.put(comment_id, data, OK)
    }

    pub fn delete_comment(&self, comment_id: u64) -> Result<ApiResponse, ApiError> {
        self.delete(comment_id, OK)
    }
}

impl ResourceValidator for CommentClient {
    const NAME: &'static str = "comment";

    fn validate_structure(comment: &Value) -> Result<(), ApiError> {
        assert::require_fields(comment, &["id", "postId", "name", "email", "body"])?;
        assert::expect_email(comment, "email")
    }

    fn schema() -> &'static CompiledSchema {
        &schemas::COMMENT
    }

    fn list_schema() -> &'static CompiledSchema {
        &schemas::COMMENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Transport;
    use crate::session::Session;
    use crate::testing::RecordingTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: &Arc<RecordingTransport>) -> CommentClient {
        let transport: Arc<dyn Transport> = transport.clone();
        CommentClient::new(Requester::new(Session::new("http://api"), transport))
    }

    #[test]
    fn parent_id_overrides_caller_data() {
        let transport = RecordingTransport::new();
        transport.push(201, r#"{"id":501,"postId":7}"#);
        client(&transport)
            .create_comment(7, Some(&json!({"postId": 99, "name": "kept"})))
            .unwrap();
        let sent: Value = serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["postId"], 7);
        assert_eq!(sent["name"], "kept");
    }

    #[test]
    fn email_filter_is_url_encoded() {
        let transport = RecordingTransport::new();
        transport.push(200, "[]");
        client(&transport).comments_by_email("Eliseo@gardner.biz").unwrap();
        assert_eq!(transport.requests()[0].path, "http://api/comments?email=Eliseo%40gardner.biz");
    }

    #[test]
    fn post_filter_path() {
        let transport = RecordingTransport::new();
        transport.push(200, "[]");
        client(&transport).comments_by_post(1).unwrap();
        assert_eq!(transport.requests()[0].path, "http://api/comments?postId=1");
    }

    #[test]
    fn structure_requires_valid_email() {
        let ok = json!({"id": 1, "postId": 1, "name": "n", "email": "Eliseo@gardner.biz", "body": "b"});
        assert!(CommentClient::validate_structure(&ok).is_ok());
        let bad = json!({"id": 1, "postId": 1, "name": "n", "email": "Eliseo", "body": "b"});
        let err = CommentClient::validate_structure(&bad).unwrap_err();
        assert_eq!(err.to_string(), "field `email`: expected a valid email address, got \"Eliseo\"");
    }
}
