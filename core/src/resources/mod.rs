//! Per-resource clients over the shared `Requester`.
//!
//! # Design
//! Each client is a thin struct holding a `Requester` clone. The CRUD surface
//! comes from `ResourceClient`; the shape checks come from
//! `ResourceValidator`. `Api` builds all four over one requester so a flow
//! shares a single session and transport.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::assert;
use crate::client::Requester;
use crate::config::HarnessConfig;
use crate::error::ApiError;
use crate::http::UreqTransport;
use crate::schema::CompiledSchema;
use crate::session::Session;

pub mod comment;
pub mod post;
pub mod todo;
pub mod user;

pub use comment::CommentClient;
pub use post::PostClient;
pub use todo::TodoClient;
pub use user::UserClient;

/// Structural and schema checks for one resource type.
pub trait ResourceValidator {
    /// Context label used in schema failure messages.
    const NAME: &'static str;

    /// Fails on the first missing or malformed field.
    fn validate_structure(item: &Value) -> Result<(), ApiError>;

    fn schema() -> &'static CompiledSchema;

    fn list_schema() -> &'static CompiledSchema;

    /// Non-empty array whose every element passes `validate_structure`.
    fn validate_list(body: &Value) -> Result<(), ApiError> {
        assert::validate_list(body, Self::validate_structure)
    }

    fn validate_schema(body: &Value) -> Result<(), ApiError> {
        Self::schema().check(body, Self::NAME)
    }

    fn validate_list_schema(body: &Value) -> Result<(), ApiError> {
        Self::list_schema().check(body, &format!("{} list", Self::NAME))
    }
}

/// Serialize a generated default payload and lay `overrides` over it.
///
/// Only top-level keys are replaced; nested objects in `overrides` win
/// wholesale.
pub(crate) fn with_overrides<T: Serialize>(defaults: T, overrides: Option<&Value>) -> Result<Value, ApiError> {
    let mut payload = serde_json::to_value(defaults).map_err(|e| ApiError::Serialization(e.to_string()))?;
    let Some(overrides) = overrides else {
        return Ok(payload);
    };
    let extra = assert::as_object(overrides, "overrides")?;
    if let Value::Object(base) = &mut payload {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    Ok(payload)
}

/// All resource clients sharing one session and transport.
#[derive(Clone)]
pub struct Api {
    requester: Requester,
    pub users: UserClient,
    pub posts: PostClient,
    pub comments: CommentClient,
    pub todos: TodoClient,
}

impl Api {
    pub fn new(requester: Requester) -> Self {
        Self {
            users: UserClient::new(requester.clone()),
            posts: PostClient::new(requester.clone()),
            comments: CommentClient::new(requester.clone()),
            todos: TodoClient::new(requester.clone()),
            requester,
        }
    }

    /// Clients over a ureq transport configured from `config`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout));
        Self::new(Requester::new(Session::new(&config.base_url), transport))
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Rebuild every client over `session`, e.g. after authenticating.
    pub fn with_session(&self, session: Session) -> Self {
        Self::new(self.requester.with_session(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewTodo;
    use serde_json::json;

    fn todo() -> NewTodo {
        NewTodo {
            user_id: 4,
            title: "generated".to_string(),
            completed: false,
        }
    }

    #[test]
    fn overrides_replace_only_named_keys() {
        let payload = with_overrides(todo(), Some(&json!({"completed": true}))).unwrap();
        assert_eq!(payload, json!({"userId": 4, "title": "generated", "completed": true}));
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let payload = with_overrides(todo(), None).unwrap();
        assert_eq!(payload["title"], "generated");
    }

    #[test]
    fn overrides_may_add_keys() {
        let payload = with_overrides(todo(), Some(&json!({"id": 9}))).unwrap();
        assert_eq!(payload["id"], 9);
    }

    #[test]
    fn non_object_overrides_are_rejected() {
        let err = with_overrides(todo(), Some(&json!([1]))).unwrap_err();
        assert!(matches!(err, ApiError::Field { ref field, .. } if field == "overrides"));
    }
}
