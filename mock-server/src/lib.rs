use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const USERS: u64 = 10;
pub const POSTS_PER_USER: u64 = 10;
pub const COMMENTS_PER_POST: u64 = 5;
pub const TODOS_PER_USER: u64 = 20;
pub const ALBUMS_PER_USER: u64 = 10;

/// Whether writes change what later reads see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Persistence {
    /// Writes are echoed back but never stored, like the public sandbox.
    #[default]
    Ephemeral,
    /// Writes are stored and deletes remove.
    Durable,
}

impl Persistence {
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some("1") | Some("true") => Persistence::Durable,
            _ => Persistence::Ephemeral,
        }
    }
}

/// Why a lookup found nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Miss {
    Resource,
    Record,
}

#[derive(Clone, Debug)]
pub struct Sandbox {
    persistence: Persistence,
    tables: BTreeMap<String, Vec<Value>>,
}

pub type Db = Arc<RwLock<Sandbox>>;

const FIRST_NAMES: [&str; 10] = [
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "Niklaus", "Radia", "Ken",
];
const LAST_NAMES: [&str; 10] = [
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Allen", "Wirth", "Perlman",
    "Thompson",
];

fn seed_user(id: u64) -> Value {
    let idx = (id - 1) as usize % FIRST_NAMES.len();
    let (first, last) = (FIRST_NAMES[idx], LAST_NAMES[idx]);
    let username = format!("{}{}", first.to_lowercase(), id);
    json!({
        "id": id,
        "name": format!("{first} {last}"),
        "username": username,
        "email": format!("{}.{}@sandbox.dev", first.to_lowercase(), last.to_lowercase()),
        "address": {
            "street": format!("{} Main Street", 100 + id),
            "suite": format!("Apt. {}", 10 * id),
            "city": "Springfield",
            "zipcode": format!("{:05}", 10_000 + id),
            "geo": { "lat": format!("-{id}.5"), "lng": format!("{id}.25") },
        },
        "phone": format!("555-010-{:04}", id),
        "website": format!("{username}.example.org"),
        "company": {
            "name": format!("{last} Systems"),
            "catchPhrase": "Reliable software for everyone",
            "bs": "ship working code",
        },
    })
}

fn seed_tables() -> BTreeMap<String, Vec<Value>> {
    let users: Vec<Value> = (1..=USERS).map(seed_user).collect();

    let posts = (1..=USERS * POSTS_PER_USER)
        .map(|id| {
            json!({
                "userId": (id - 1) / POSTS_PER_USER + 1,
                "id": id,
                "title": format!("post {id} title"),
                "body": format!("body of post {id}"),
            })
        })
        .collect();

    let comments = (1..=USERS * POSTS_PER_USER * COMMENTS_PER_POST)
        .map(|id| {
            json!({
                "postId": (id - 1) / COMMENTS_PER_POST + 1,
                "id": id,
                "name": format!("comment {id}"),
                "email": format!("reader{id}@mail.test"),
                "body": format!("body of comment {id}"),
            })
        })
        .collect();

    let todos = (1..=USERS * TODOS_PER_USER)
        .map(|id| {
            json!({
                "userId": (id - 1) / TODOS_PER_USER + 1,
                "id": id,
                "title": format!("todo {id}"),
                "completed": id % 3 == 0,
            })
        })
        .collect();

    let albums = (1..=USERS * ALBUMS_PER_USER)
        .map(|id| {
            json!({
                "userId": (id - 1) / ALBUMS_PER_USER + 1,
                "id": id,
                "title": format!("album {id}"),
            })
        })
        .collect();

    BTreeMap::from([
        ("users".to_string(), users),
        ("posts".to_string(), posts),
        ("comments".to_string(), comments),
        ("todos".to_string(), todos),
        ("albums".to_string(), albums),
    ])
}

/// Filter values arrive as strings; compare against the field's text form.
fn field_matches(item: &Value, field: &str, expected: &str) -> bool {
    match item.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

fn id_of(item: &Value) -> Option<u64> {
    item.get("id").and_then(Value::as_u64)
}

/// Foreign key linking `child` records to a `parent` record.
fn foreign_key(parent: &str, child: &str) -> Option<&'static str> {
    match (parent, child) {
        ("users", "posts" | "albums" | "todos") => Some("userId"),
        ("posts", "comments") => Some("postId"),
        _ => None,
    }
}

impl Sandbox {
    pub fn seeded(persistence: Persistence) -> Self {
        Self {
            persistence,
            tables: seed_tables(),
        }
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    fn table(&self, resource: &str) -> Result<&Vec<Value>, Miss> {
        self.tables.get(resource).ok_or(Miss::Resource)
    }

    fn position(&self, resource: &str, id: u64) -> Result<usize, Miss> {
        self.table(resource)?
            .iter()
            .position(|item| id_of(item) == Some(id))
            .ok_or(Miss::Record)
    }

    pub fn list(&self, resource: &str, filters: &HashMap<String, String>) -> Result<Vec<Value>, Miss> {
        Ok(self
            .table(resource)?
            .iter()
            .filter(|item| filters.iter().all(|(field, value)| field_matches(item, field, value)))
            .cloned()
            .collect())
    }

    pub fn get(&self, resource: &str, id: u64) -> Result<Value, Miss> {
        let idx = self.position(resource, id)?;
        Ok(self.tables[resource][idx].clone())
    }

    pub fn children(&self, parent: &str, id: u64, child: &str) -> Result<Vec<Value>, Miss> {
        self.table(parent)?;
        let key = foreign_key(parent, child).ok_or(Miss::Resource)?;
        let filter = HashMap::from([(key.to_string(), id.to_string())]);
        self.list(child, &filter)
    }

    /// Id the next created record receives.
    pub fn next_id(&self, resource: &str) -> Result<u64, Miss> {
        let table = self.table(resource)?;
        Ok(table.iter().filter_map(id_of).max().unwrap_or(0) + 1)
    }

    pub fn create(&mut self, resource: &str, mut body: Map<String, Value>) -> Result<Value, Miss> {
        let id = self.next_id(resource)?;
        body.insert("id".to_string(), Value::from(id));
        let record = Value::Object(body);
        if self.persistence == Persistence::Durable {
            if let Some(table) = self.tables.get_mut(resource) {
                table.push(record.clone());
            }
        }
        Ok(record)
    }

    pub fn replace(&mut self, resource: &str, id: u64, mut body: Map<String, Value>) -> Result<Value, Miss> {
        let idx = self.position(resource, id)?;
        body.insert("id".to_string(), Value::from(id));
        let record = Value::Object(body);
        if self.persistence == Persistence::Durable {
            if let Some(table) = self.tables.get_mut(resource) {
                table[idx] = record.clone();
            }
        }
        Ok(record)
    }

    pub fn merge(&mut self, resource: &str, id: u64, body: Map<String, Value>) -> Result<Value, Miss> {
        let idx = self.position(resource, id)?;
        let mut record = self.tables[resource][idx].clone();
        if let Value::Object(stored) = &mut record {
            stored.extend(body);
            stored.insert("id".to_string(), Value::from(id));
        }
        if self.persistence == Persistence::Durable {
            if let Some(table) = self.tables.get_mut(resource) {
                table[idx] = record.clone();
            }
        }
        Ok(record)
    }

    /// Unknown ids still succeed, as on the public sandbox.
    pub fn remove(&mut self, resource: &str, id: u64) -> Result<(), Miss> {
        let persistence = self.persistence;
        let table = self.tables.get_mut(resource).ok_or(Miss::Resource)?;
        if persistence == Persistence::Durable {
            table.retain(|item| id_of(item) != Some(id));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

type Reply = (StatusCode, Json<Value>);

fn not_found() -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

fn reply(result: Result<Value, Miss>, status: StatusCode) -> Reply {
    match result {
        Ok(value) => (status, Json(value)),
        Err(_) => not_found(),
    }
}

fn object_body(body: Value) -> Result<Map<String, Value>, Reply> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("expected a JSON object, got {other}") })),
        )),
    }
}

pub fn app() -> Router {
    app_with(Persistence::default())
}

pub fn app_with(persistence: Persistence) -> Router {
    let db: Db = Arc::new(RwLock::new(Sandbox::seeded(persistence)));
    Router::new()
        .route("/auth/login", post(login))
        .route("/{resource}", get(list_records).post(create_record))
        .route(
            "/{resource}/{id}",
            get(get_record)
                .put(replace_record)
                .patch(merge_record)
                .delete(delete_record),
        )
        .route("/{resource}/{id}/{child}", get(list_children))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Persistence::default()).await
}

pub async fn run_with(listener: TcpListener, persistence: Persistence) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), ?persistence, "sandbox serving");
    axum::serve(listener, app_with(persistence)).await
}

async fn list_records(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Reply {
    debug!(%resource, ?filters, "list");
    let sandbox = db.read().await;
    match sandbox.list(&resource, &filters) {
        Ok(items) => (StatusCode::OK, Json(Value::Array(items))),
        Err(_) => not_found(),
    }
}

async fn get_record(State(db): State<Db>, Path((resource, id)): Path<(String, u64)>) -> Reply {
    debug!(%resource, id, "get");
    reply(db.read().await.get(&resource, id), StatusCode::OK)
}

async fn list_children(
    State(db): State<Db>,
    Path((parent, id, child)): Path<(String, u64, String)>,
) -> Reply {
    debug!(%parent, id, %child, "list children");
    match db.read().await.children(&parent, id, &child) {
        Ok(items) => (StatusCode::OK, Json(Value::Array(items))),
        Err(_) => not_found(),
    }
}

async fn create_record(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let body = match object_body(body) {
        Ok(body) => body,
        Err(rejection) => return rejection,
    };
    let created = db.write().await.create(&resource, body);
    debug!(%resource, ok = created.is_ok(), "create");
    reply(created, StatusCode::CREATED)
}

async fn replace_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> Reply {
    let body = match object_body(body) {
        Ok(body) => body,
        Err(rejection) => return rejection,
    };
    debug!(%resource, id, "replace");
    reply(db.write().await.replace(&resource, id, body), StatusCode::OK)
}

async fn merge_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> Reply {
    let body = match object_body(body) {
        Ok(body) => body,
        Err(rejection) => return rejection,
    };
    debug!(%resource, id, "merge");
    reply(db.write().await.merge(&resource, id, body), StatusCode::OK)
}

async fn delete_record(State(db): State<Db>, Path((resource, id)): Path<(String, u64)>) -> Reply {
    debug!(%resource, id, "delete");
    match db.write().await.remove(&resource, id) {
        Ok(()) => (StatusCode::OK, Json(json!({}))),
        Err(_) => not_found(),
    }
}

async fn login(Json(credentials): Json<Credentials>) -> Reply {
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "username and password are required" })),
        );
    }
    debug!(username = %credentials.username, "login");
    (
        StatusCode::OK,
        Json(json!({ "token": format!("sandbox-token-{}", credentials.username) })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filters() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn seed_has_expected_sizes() {
        let sandbox = Sandbox::seeded(Persistence::Ephemeral);
        assert_eq!(sandbox.list("users", &no_filters()).unwrap().len(), 10);
        assert_eq!(sandbox.list("posts", &no_filters()).unwrap().len(), 100);
        assert_eq!(sandbox.list("comments", &no_filters()).unwrap().len(), 500);
        assert_eq!(sandbox.list("todos", &no_filters()).unwrap().len(), 200);
        assert_eq!(sandbox.list("albums", &no_filters()).unwrap().len(), 100);
    }

    #[test]
    fn seed_relations_are_consistent() {
        let sandbox = Sandbox::seeded(Persistence::Ephemeral);
        let post = sandbox.get("posts", 11).unwrap();
        assert_eq!(post["userId"], 2);
        let comment = sandbox.get("comments", 6).unwrap();
        assert_eq!(comment["postId"], 2);
        assert_eq!(sandbox.get("todos", 3).unwrap()["completed"], true);
        assert_eq!(sandbox.get("todos", 4).unwrap()["completed"], false);
    }

    #[test]
    fn filters_compare_text_form() {
        let sandbox = Sandbox::seeded(Persistence::Ephemeral);
        let by_user = HashMap::from([("userId".to_string(), "3".to_string())]);
        let posts = sandbox.list("posts", &by_user).unwrap();
        assert_eq!(posts.len(), 10);
        assert!(posts.iter().all(|p| p["userId"] == 3));

        let done = HashMap::from([("completed".to_string(), "true".to_string())]);
        let todos = sandbox.list("todos", &done).unwrap();
        assert_eq!(todos.len(), 66);

        let email = sandbox.get("comments", 1).unwrap()["email"].as_str().unwrap().to_string();
        let by_email = HashMap::from([("email".to_string(), email)]);
        assert_eq!(sandbox.list("comments", &by_email).unwrap().len(), 1);
    }

    #[test]
    fn unknown_resource_and_record() {
        let sandbox = Sandbox::seeded(Persistence::Ephemeral);
        assert_eq!(sandbox.list("widgets", &no_filters()).unwrap_err(), Miss::Resource);
        assert_eq!(sandbox.get("users", 999_999).unwrap_err(), Miss::Record);
        assert_eq!(sandbox.children("posts", 1, "albums").unwrap_err(), Miss::Resource);
    }

    #[test]
    fn children_follow_foreign_keys() {
        let sandbox = Sandbox::seeded(Persistence::Ephemeral);
        assert_eq!(sandbox.children("users", 1, "todos").unwrap().len(), 20);
        assert_eq!(sandbox.children("posts", 1, "comments").unwrap().len(), 5);
        assert!(sandbox.children("users", 999_999, "posts").unwrap().is_empty());
    }

    #[test]
    fn ephemeral_writes_are_not_stored() {
        let mut sandbox = Sandbox::seeded(Persistence::Ephemeral);
        let created = sandbox.create("posts", Map::new()).unwrap();
        assert_eq!(created["id"], 101);
        assert_eq!(sandbox.get("posts", 101).unwrap_err(), Miss::Record);
        assert_eq!(sandbox.create("posts", Map::new()).unwrap()["id"], 101);

        sandbox.remove("posts", 1).unwrap();
        assert!(sandbox.get("posts", 1).is_ok());
    }

    #[test]
    fn durable_writes_are_stored() {
        let mut sandbox = Sandbox::seeded(Persistence::Durable);
        let mut body = Map::new();
        body.insert("title".to_string(), json!("kept"));
        let created = sandbox.create("posts", body).unwrap();
        assert_eq!(created["id"], 101);
        assert_eq!(sandbox.get("posts", 101).unwrap()["title"], "kept");

        let mut patch = Map::new();
        patch.insert("title".to_string(), json!("changed"));
        let merged = sandbox.merge("posts", 1, patch).unwrap();
        assert_eq!(merged["title"], "changed");
        assert_eq!(merged["userId"], 1);

        sandbox.remove("posts", 101).unwrap();
        assert_eq!(sandbox.get("posts", 101).unwrap_err(), Miss::Record);
    }

    #[test]
    fn replace_keeps_path_id() {
        let mut sandbox = Sandbox::seeded(Persistence::Durable);
        let mut body = Map::new();
        body.insert("id".to_string(), json!(42));
        body.insert("title".to_string(), json!("new"));
        let replaced = sandbox.replace("posts", 1, body).unwrap();
        assert_eq!(replaced["id"], 1);
        assert!(replaced.get("userId").is_none());
        assert_eq!(sandbox.replace("posts", 999, Map::new()).unwrap_err(), Miss::Record);
    }

    #[test]
    fn persistence_flag() {
        assert_eq!(Persistence::from_flag(Some("1")), Persistence::Durable);
        assert_eq!(Persistence::from_flag(Some("true")), Persistence::Durable);
        assert_eq!(Persistence::from_flag(Some("0")), Persistence::Ephemeral);
        assert_eq!(Persistence::from_flag(None), Persistence::Ephemeral);
    }
}
