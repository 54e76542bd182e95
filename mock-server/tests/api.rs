use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Persistence};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_users_returns_seeded_users() {
    let resp = app().oneshot(get("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[http::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("application/json"));
    let users = body_json(resp).await;
    let ids: Vec<u64> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn list_filters_by_query() {
    let resp = app().oneshot(get("/posts?userId=2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let posts = body_json(resp).await;
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 10);
    assert!(posts.iter().all(|p| p["userId"] == 2));

    let resp = app().oneshot(get("/todos?completed=false&userId=1")).await.unwrap();
    let todos = body_json(resp).await;
    assert!(todos.as_array().unwrap().iter().all(|t| t["completed"] == false && t["userId"] == 1));
}

#[tokio::test]
async fn email_filter_decodes_percent_encoding() {
    let resp = app().oneshot(get("/comments?email=reader7%40mail.test")).await.unwrap();
    let comments = body_json(resp).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["id"], 7);
}

#[tokio::test]
async fn unknown_resource_returns_404() {
    let resp = app().oneshot(get("/widgets")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- get ---

#[tokio::test]
async fn get_user_by_id() {
    let resp = app().oneshot(get("/users/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["id"], 1);
    assert!(user["address"]["geo"]["lat"].is_string());
    assert!(user["company"]["catchPhrase"].is_string());
}

#[tokio::test]
async fn get_missing_record_returns_empty_404() {
    let resp = app().oneshot(get("/users/999999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"{}");
}

#[tokio::test]
async fn get_non_numeric_id_returns_400() {
    let resp = app().oneshot(get("/users/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- nested ---

#[tokio::test]
async fn nested_children() {
    let resp = app().oneshot(get("/users/3/todos")).await.unwrap();
    let todos = body_json(resp).await;
    assert_eq!(todos.as_array().unwrap().len(), 20);
    assert!(todos.as_array().unwrap().iter().all(|t| t["userId"] == 3));

    let resp = app().oneshot(get("/posts/4/comments")).await.unwrap();
    let comments = body_json(resp).await;
    assert_eq!(comments.as_array().unwrap().len(), 5);

    let resp = app().oneshot(get("/users/1/albums")).await.unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn unsupported_nesting_returns_404() {
    let resp = app().oneshot(get("/todos/1/comments")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- writes ---

#[tokio::test]
async fn create_echoes_body_with_next_id() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"title":"t","body":"b","userId":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post = body_json(resp).await;
    assert_eq!(post["id"], 101);
    assert_eq!(post["title"], "t");
    assert_eq!(post["userId"], 1);
}

#[tokio::test]
async fn create_rejects_non_object_body() {
    let resp = app().oneshot(json_request("POST", "/posts", "[1,2]")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_unknown_id_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/posts/101", r#"{"title":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_merges_into_stored_record() {
    let resp = app()
        .oneshot(json_request("PATCH", "/todos/1", r#"{"completed":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todo = body_json(resp).await;
    assert_eq!(todo["id"], 1);
    assert_eq!(todo["completed"], true);
    assert_eq!(todo["title"], "todo 1");
}

#[tokio::test]
async fn delete_returns_empty_object() {
    let resp = app()
        .oneshot(Request::builder().method("DELETE").uri("/posts/1").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"{}");
}

// --- auth ---

#[tokio::test]
async fn login_issues_token() {
    let resp = app()
        .oneshot(json_request("POST", "/auth/login", r#"{"username":"ada","password":"pw"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["token"], "sandbox-token-ada");
}

#[tokio::test]
async fn login_without_password_is_unauthorized() {
    let resp = app()
        .oneshot(json_request("POST", "/auth/login", r#"{"username":"ada"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- persistence modes ---

#[tokio::test]
async fn ephemeral_lifecycle_forgets_writes() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Walk dog","userId":1,"completed":false}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_u64().unwrap();
    assert_eq!(id, 201);

    // never stored
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete is acknowledged but the record stays
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(Request::builder().method("DELETE").uri("/todos/1").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = ServiceExt::ready(&mut app).await.unwrap().call(get("/todos/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn durable_crud_lifecycle() {
    use tower::Service;

    let mut app = app_with(Persistence::Durable).into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Walk dog","userId":1,"completed":false}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_u64().unwrap();
    assert_eq!(id, 201);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["title"], "Walk dog");

    // patch
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/todos/{id}"), r#"{"completed":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched = body_json(resp).await;
    assert_eq!(patched["completed"], true);
    assert_eq!(patched["title"], "Walk dog"); // unchanged

    // filtered list sees the new todo
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/users/1/todos"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 21);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/todos/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // gone after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
