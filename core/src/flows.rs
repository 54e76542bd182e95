//! Canned end-to-end flows over the [`Api`] facade.
//!
//! `create_chain`, `post_crud` and `complete_todo` read back what they
//! created and need a backend that stores writes. The remaining flows hold
//! against the ephemeral public sandbox as well.

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tracing::instrument;

use crate::assert;
use crate::client::ResourceClient;
use crate::error::ApiError;
use crate::fake;
use crate::http::{json_kind, ApiResponse};
use crate::resources::{
    Api, CommentClient, PostClient, ResourceValidator, TodoClient, UserClient,
};
use crate::scenario::{recorded, Scenario, ScenarioError, ScenarioReport};
use crate::status::NOT_FOUND;

/// Default end-to-end budget for [`flow_timing`].
pub const FLOW_BUDGET: Duration = Duration::from_millis(5000);

/// An id no seeded resource uses.
pub const MISSING_ID: u64 = 999_999;

pub type FlowResult<S> = Result<ScenarioReport<S>, ScenarioError>;

fn u64_field(value: &Value, field: &str) -> Result<u64, ApiError> {
    value.get(field).and_then(Value::as_u64).ok_or_else(|| {
        ApiError::field(
            field,
            "a non-negative integer",
            value.get(field).map_or("missing", json_kind),
        )
    })
}

/// Ids of the first `limit` elements of a list response.
fn leading_ids(response: &ApiResponse, limit: usize) -> Result<Vec<u64>, ApiError> {
    response
        .items()?
        .iter()
        .take(limit)
        .map(|item| u64_field(item, "id"))
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Chain {
    pub user_id: Option<u64>,
    pub post_id: Option<u64>,
    pub comment_id: Option<u64>,
}

/// user → post → comment, then read the chain of foreign keys back.
#[instrument(skip(api))]
pub fn create_chain(api: &Api) -> FlowResult<Chain> {
    Scenario::new("create_chain")
        .step("create user", move |s: &mut Chain| {
            let resp = api.users.create_user(None)?;
            UserClient::validate_structure(&resp.body)?;
            s.user_id = Some(resp.id()?);
            Ok(())
        })
        .step("create post for user", move |s: &mut Chain| {
            let user_id = recorded(s.user_id, "user id")?;
            let resp = api.posts.create_post(Some(&json!({ "userId": user_id })))?;
            assert::expect_relation(&resp.body, "userId", user_id)?;
            s.post_id = Some(resp.id()?);
            Ok(())
        })
        .step("comment on post", move |s: &mut Chain| {
            let post_id = recorded(s.post_id, "post id")?;
            let resp = api.comments.create_comment(post_id, None)?;
            assert::expect_relation(&resp.body, "postId", post_id)?;
            s.comment_id = Some(resp.id()?);
            Ok(())
        })
        .step("read chain back", move |s: &mut Chain| {
            let user_id = recorded(s.user_id, "user id")?;
            let post_id = recorded(s.post_id, "post id")?;
            let comment_id = recorded(s.comment_id, "comment id")?;

            let post = api.posts.get_post(post_id)?;
            assert::expect_relation(&post.body, "userId", user_id)?;
            let comment = api.comments.get_comment(comment_id)?;
            assert::expect_relation(&comment.body, "postId", post_id)
        })
        .run(Chain::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Crud {
    pub post_id: Option<u64>,
    pub title: Option<String>,
    pub deleted: bool,
}

/// create → read → update (PUT) → delete → confirm 404.
#[instrument(skip(api))]
pub fn post_crud(api: &Api) -> FlowResult<Crud> {
    Scenario::new("post_crud")
        .step("create post", move |s: &mut Crud| {
            let title = fake::sentence();
            let resp = api.posts.create_post(Some(&json!({ "title": title })))?;
            PostClient::validate_structure(&resp.body)?;
            assert::expect_field_eq(&resp.body, "title", &json!(title))?;
            s.post_id = Some(resp.id()?);
            s.title = Some(title);
            Ok(())
        })
        .step("read post", move |s: &mut Crud| {
            let post_id = recorded(s.post_id, "post id")?;
            let resp = api.posts.get_post(post_id)?;
            PostClient::validate_schema(&resp.body)?;
            assert::expect_field_eq(&resp.body, "id", &json!(post_id))?;
            assert::expect_field_eq(&resp.body, "title", &json!(s.title))
        })
        .step("replace post", move |s: &mut Crud| {
            let post_id = recorded(s.post_id, "post id")?;
            let title = format!("{} (edited)", s.title.as_deref().unwrap_or_default());
            let data = json!({
                "id": post_id,
                "title": title,
                "body": fake::sentence(),
                "userId": fake::seed_user_id(),
            });
            let resp = api.posts.update_post(post_id, &data)?;
            assert::expect_field_eq(&resp.body, "title", &json!(title))?;
            s.title = Some(title);
            Ok(())
        })
        .step("delete post", move |s: &mut Crud| {
            let post_id = recorded(s.post_id, "post id")?;
            api.posts.delete_post(post_id)?;
            s.deleted = true;
            Ok(())
        })
        .step("confirm removal", move |s: &mut Crud| {
            let post_id = recorded(s.post_id, "post id")?;
            api.posts.get_by_id(post_id, NOT_FOUND).map(|_| ())
        })
        .run(Crud::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TodoProgress {
    pub todo_id: Option<u64>,
    pub completed: bool,
}

/// create an open todo → PATCH `{completed: true}` → read it back.
#[instrument(skip(api))]
pub fn complete_todo(api: &Api) -> FlowResult<TodoProgress> {
    Scenario::new("complete_todo")
        .step("create open todo", move |s: &mut TodoProgress| {
            let resp = api.todos.create_todo(Some(&json!({ "completed": false })))?;
            assert::expect_field_eq(&resp.body, "completed", &json!(false))?;
            s.todo_id = Some(resp.id()?);
            Ok(())
        })
        .step("mark completed", move |s: &mut TodoProgress| {
            let todo_id = recorded(s.todo_id, "todo id")?;
            let resp = api.todos.complete_todo(todo_id)?;
            assert::expect_field_eq(&resp.body, "completed", &json!(true))?;
            s.completed = true;
            Ok(())
        })
        .step("read todo back", move |s: &mut TodoProgress| {
            let todo_id = recorded(s.todo_id, "todo id")?;
            let resp = api.todos.get_todo(todo_id)?;
            TodoClient::validate_schema(&resp.body)?;
            assert::expect_field_eq(&resp.body, "completed", &json!(true))
        })
        .run(TodoProgress::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NestedRead {
    pub post_ids: Vec<u64>,
    pub comments_checked: usize,
}

/// user → their posts → comments of the first three posts.
#[instrument(skip(api))]
pub fn nested_read(api: &Api, user_id: u64) -> FlowResult<NestedRead> {
    Scenario::new("nested_read")
        .step("read user", move |_: &mut NestedRead| {
            let resp = api.users.get_user(user_id)?;
            UserClient::validate_schema(&resp.body)?;
            assert::expect_field_eq(&resp.body, "id", &json!(user_id))
        })
        .step("read user's posts", move |s: &mut NestedRead| {
            let resp = api.users.user_posts(user_id)?;
            PostClient::validate_list(&resp.body)?;
            assert::expect_all_related(&resp.body, "userId", user_id)?;
            s.post_ids = leading_ids(&resp, 3)?;
            Ok(())
        })
        .step("read comments of first posts", move |s: &mut NestedRead| {
            for &post_id in &s.post_ids {
                let resp = api.posts.post_comments(post_id)?;
                CommentClient::validate_list(&resp.body)?;
                assert::expect_all_related(&resp.body, "postId", post_id)?;
                s.comments_checked += resp.items()?.len();
            }
            Ok(())
        })
        .run(NestedRead::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeUpdate {
    pub posts_before: usize,
    pub posts_after: usize,
}

/// Replacing a user leaves their posts untouched.
#[instrument(skip(api))]
pub fn cascade_update(api: &Api, user_id: u64) -> FlowResult<CascadeUpdate> {
    Scenario::new("cascade_update")
        .step("count posts", move |s: &mut CascadeUpdate| {
            s.posts_before = api.users.user_posts(user_id)?.items()?.len();
            Ok(())
        })
        .step("replace user", move |_: &mut CascadeUpdate| {
            let data = json!({
                "id": user_id,
                "name": "Updated Name",
                "username": "username_updated",
                "email": "updated@example.com",
            });
            let resp = api.users.update_user(user_id, &data)?;
            assert::expect_field_eq(&resp.body, "name", &data["name"])
        })
        .step("recount posts", move |s: &mut CascadeUpdate| {
            s.posts_after = api.users.user_posts(user_id)?.items()?.len();
            if s.posts_after != s.posts_before {
                return Err(ApiError::Assertion(format!(
                    "user {user_id} had {} posts before the update and {} after",
                    s.posts_before, s.posts_after
                )));
            }
            Ok(())
        })
        .run(CascadeUpdate::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub user_id: Option<u64>,
    pub comment_ids: Vec<u64>,
    pub post_deleted: bool,
    pub user_deleted: bool,
}

/// Two comments of a post, then the post, then its author.
#[instrument(skip(api))]
pub fn hierarchical_delete(api: &Api, post_id: u64) -> FlowResult<Deletion> {
    Scenario::new("hierarchical_delete")
        .step("load post", move |s: &mut Deletion| {
            let resp = api.posts.get_post(post_id)?;
            s.user_id = Some(u64_field(&resp.body, "userId")?);
            Ok(())
        })
        .step("load comments", move |s: &mut Deletion| {
            let resp = api.posts.post_comments(post_id)?;
            s.comment_ids = leading_ids(&resp, 2)?;
            Ok(())
        })
        .step("delete comments", move |s: &mut Deletion| {
            s.comment_ids
                .iter()
                .try_for_each(|&id| api.comments.delete_comment(id).map(|_| ()))
        })
        .step("delete post", move |s: &mut Deletion| {
            api.posts.delete_post(post_id)?;
            s.post_deleted = true;
            Ok(())
        })
        .step("delete user", move |s: &mut Deletion| {
            let user_id = recorded(s.user_id, "user id")?;
            api.users.delete_user(user_id)?;
            s.user_deleted = true;
            Ok(())
        })
        .run(Deletion::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Audit {
    pub post_ids: Vec<u64>,
    pub total_comments: usize,
}

/// Comments across a user's first five posts all point at their post.
#[instrument(skip(api))]
pub fn relationship_audit(api: &Api, user_id: u64) -> FlowResult<Audit> {
    Scenario::new("relationship_audit")
        .step("read posts", move |s: &mut Audit| {
            let resp = api.posts.posts_by_user(user_id)?;
            assert::expect_all_related(&resp.body, "userId", user_id)?;
            s.post_ids = leading_ids(&resp, 5)?;
            Ok(())
        })
        .step("read comments", move |s: &mut Audit| {
            for &post_id in &s.post_ids {
                let resp = api.comments.comments_by_post(post_id)?;
                assert::expect_all_related(&resp.body, "postId", post_id)?;
                s.total_comments += resp.items()?.len();
            }
            Ok(())
        })
        .step("tally", move |s: &mut Audit| {
            if s.total_comments == 0 {
                return Err(ApiError::Assertion(format!(
                    "no comments across posts {:?} of user {user_id}",
                    s.post_ids
                )));
            }
            Ok(())
        })
        .run(Audit::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorCascade {
    pub orphan_comment_id: Option<u64>,
}

/// Missing parents answer 404, yet a comment under a missing post is still
/// accepted with 201. The backend does not check foreign keys.
#[instrument(skip(api))]
pub fn error_cascade(api: &Api) -> FlowResult<ErrorCascade> {
    Scenario::new("error_cascade")
        .step("missing user", move |_: &mut ErrorCascade| {
            api.users.get_by_id(MISSING_ID, NOT_FOUND).map(|_| ())
        })
        .step("missing post", move |_: &mut ErrorCascade| {
            api.posts.get_by_id(MISSING_ID, NOT_FOUND).map(|_| ())
        })
        .step("comment on missing post", move |s: &mut ErrorCascade| {
            let resp = api.comments.create_comment(MISSING_ID, None)?;
            assert::expect_relation(&resp.body, "postId", MISSING_ID)?;
            s.orphan_comment_id = Some(resp.id()?);
            Ok(())
        })
        .run(ErrorCascade::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteThenRead {
    pub dependents_after_delete: usize,
}

/// Deleting a post does not cascade: its comments stay readable with 200.
#[instrument(skip(api))]
pub fn delete_then_read(api: &Api, post_id: u64) -> FlowResult<DeleteThenRead> {
    Scenario::new("delete_then_read")
        .step("delete post", move |_: &mut DeleteThenRead| {
            api.posts.delete_post(post_id).map(|_| ())
        })
        .step("read dependents", move |s: &mut DeleteThenRead| {
            let resp = api.posts.post_comments(post_id)?;
            s.dependents_after_delete = resp.items()?.len();
            Ok(())
        })
        .run(DeleteThenRead::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timing {
    pub started: Option<Instant>,
    pub first_post: Option<u64>,
    pub elapsed: Duration,
}

/// user → posts → comments of the first post, all within `budget`.
#[instrument(skip(api))]
pub fn flow_timing(api: &Api, user_id: u64, budget: Duration) -> FlowResult<Timing> {
    Scenario::new("flow_timing")
        .step("read user", move |s: &mut Timing| {
            s.started = Some(Instant::now());
            api.users.get_user(user_id).map(|_| ())
        })
        .step("read posts", move |s: &mut Timing| {
            let resp = api.users.user_posts(user_id)?;
            s.first_post = leading_ids(&resp, 1)?.first().copied();
            Ok(())
        })
        .step("read comments", move |s: &mut Timing| {
            let post_id = recorded(s.first_post, "first post id")?;
            api.posts.post_comments(post_id).map(|_| ())
        })
        .step("within budget", move |s: &mut Timing| {
            let started = s
                .started
                .ok_or_else(|| ApiError::Assertion("flow start was not recorded".to_string()))?;
            s.elapsed = started.elapsed();
            if s.elapsed >= budget {
                return Err(ApiError::Assertion(format!(
                    "flow took {}ms, expected under {}ms",
                    s.elapsed.as_millis(),
                    budget.as_millis()
                )));
            }
            Ok(())
        })
        .run(Timing::default())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub todos: usize,
}

/// Read-only contract of every list endpoint.
#[instrument(skip(api))]
pub fn catalog_contract(api: &Api, max_response_time: Duration) -> FlowResult<Catalog> {
    Scenario::new("catalog_contract")
        .step("users", move |s: &mut Catalog| {
            let resp = api.users.list_users()?;
            assert::expect_json_content_type(&resp)?;
            assert::expect_response_time(&resp, max_response_time)?;
            UserClient::validate_list_schema(&resp.body)?;
            UserClient::validate_list(&resp.body)?;
            assert::expect_unique_ids(&resp.body)?;
            assert::expect_ascending_ids(&resp.body)?;
            s.users = resp.items()?.len();
            Ok(())
        })
        .step("posts", move |s: &mut Catalog| {
            let resp = api.posts.list_posts()?;
            PostClient::validate_list_schema(&resp.body)?;
            assert::expect_unique_ids(&resp.body)?;
            s.posts = resp.items()?.len();
            Ok(())
        })
        .step("comments", move |s: &mut Catalog| {
            let resp = api.comments.list_comments()?;
            CommentClient::validate_list_schema(&resp.body)?;
            s.comments = resp.items()?.len();
            Ok(())
        })
        .step("todos", move |s: &mut Catalog| {
            let resp = api.todos.list_todos()?;
            TodoClient::validate_list_schema(&resp.body)?;
            s.todos = resp.items()?.len();
            Ok(())
        })
        .step("completed filter", move |_: &mut Catalog| {
            let resp = api.todos.completed_todos()?;
            resp.items()?
                .iter()
                .try_for_each(|todo| assert::expect_field_eq(todo, "completed", &json!(true)))
        })
        .step("repeatable read", move |_: &mut Catalog| {
            let first = api.posts.get_post(1)?;
            let second = api.posts.get_post(1)?;
            assert::expect_equal_ignoring(&first.body, &second.body, &[])
        })
        .run(Catalog::default())
}
