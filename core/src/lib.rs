//! Contract-test harness for a JSONPlaceholder-style REST API.
//!
//! # Overview
//! Typed clients for users, posts, comments and todos issue JSON requests
//! through a pluggable `Transport`, enforce the expected status of every
//! call, and return the parsed body with its timing. Structural, schema and
//! relational assertions turn each response into a `Result`, and multi-step
//! flows chain created ids from one call to the next.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`).
//!   The transport executes the round-trip, so clients and flows are tested
//!   against a scripted transport without a network.
//! - `Requester` holds an explicit `Session` (base URL, headers, optional
//!   bearer token). There is no global auth state.
//! - `ResourceClient` supplies generic CRUD over a base path; one small
//!   struct per resource adds the named operations and its validator.
//! - Schemas are declarative data compiled once into `CompiledSchema`
//!   and report every violation, not just the first.
//! - DTOs are defined independently from the sandbox crate; integration
//!   tests catch drift.

pub mod assert;
pub mod client;
pub mod config;
pub mod error;
pub mod fake;
pub mod fixture;
pub mod flows;
pub mod http;
pub mod logging;
pub mod resources;
pub mod scenario;
pub mod schema;
pub mod schemas;
pub mod session;
pub mod status;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{encode_query, Requester, ResourceClient};
pub use config::{ConfigError, HarnessConfig};
pub use error::ApiError;
pub use fixture::FixtureLoader;
pub use http::{ApiResponse, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use resources::{Api, CommentClient, PostClient, ResourceValidator, TodoClient, UserClient};
pub use scenario::{Scenario, ScenarioError, ScenarioReport};
pub use schema::{CompiledSchema, Schema, SchemaError, Violation};
pub use session::Session;
pub use status::ExpectedStatus;
pub use types::{Comment, NewComment, NewPost, NewTodo, NewUser, Post, Todo, User};
