//! Schemas for the four API resources, compiled once per process.

use std::sync::LazyLock;

use crate::schema::{CompiledSchema, Format, Schema};

pub fn user() -> Schema {
    let geo = Schema::object()
        .property("lat", Schema::string())
        .property("lng", Schema::string());
    let address = Schema::object()
        .property("street", Schema::string())
        .property("suite", Schema::string())
        .property("city", Schema::string())
        .property("zipcode", Schema::string())
        .property("geo", geo);
    let company = Schema::object()
        .property("name", Schema::string())
        .property("catchPhrase", Schema::string())
        .property("bs", Schema::string());

    Schema::object()
        .required(&["id", "name", "username", "email"])
        .property("id", Schema::number())
        .property("name", Schema::string().min_length(1))
        .property("username", Schema::string().min_length(1))
        .property("email", Schema::string().format(Format::Email))
        .property("address", address)
        .property("phone", Schema::string())
        .property("website", Schema::string())
        .property("company", company)
}

pub fn post() -> Schema {
    Schema::object()
        .required(&["userId", "id", "title", "body"])
        .property("userId", Schema::number())
        .property("id", Schema::number())
        .property("title", Schema::string().min_length(1))
        .property("body", Schema::string().min_length(1))
}

pub fn comment() -> Schema {
    Schema::object()
        .required(&["postId", "id", "name", "email", "body"])
        .property("postId", Schema::number())
        .property("id", Schema::number())
        .property("name", Schema::string().min_length(1))
        .property("email", Schema::string().format(Format::Email))
        .property("body", Schema::string().min_length(1))
}

pub fn todo() -> Schema {
    Schema::object()
        .required(&["userId", "id", "title", "completed"])
        .property("userId", Schema::number())
        .property("id", Schema::number())
        .property("title", Schema::string().min_length(1))
        .property("completed", Schema::boolean())
}

/// Non-empty array whose every element matches `item`.
pub fn non_empty_list(item: Schema) -> Schema {
    Schema::array_of(item).min_items(1)
}

fn compiled(schema: Schema) -> CompiledSchema {
    schema
        .compile()
        .unwrap_or_else(|e| panic!("built-in resource schema is inconsistent: {e}"))
}

pub static USER: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(user()));
pub static USERS: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(non_empty_list(user())));
pub static POST: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(post()));
pub static POSTS: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(non_empty_list(post())));
pub static COMMENT: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(comment()));
pub static COMMENTS: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(non_empty_list(comment())));
pub static TODO: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(todo()));
pub static TODOS: LazyLock<CompiledSchema> = LazyLock::new(|| compiled(non_empty_list(todo())));

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_resource_schemas_compile() {
        for schema in [user(), post(), comment(), todo()] {
            schema.compile().unwrap();
            non_empty_list(schema).compile().unwrap();
        }
    }

    #[test]
    fn seed_user_shape_is_valid() {
        let user = json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": {"lat": "-37.3159", "lng": "81.1496"}
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {"name": "Romaguera-Crona", "catchPhrase": "Multi-layered client-server neural-net", "bs": "harness real-time e-markets"}
        });
        assert!(USER.validate(&user).is_empty());
        assert!(USERS.validate(&json!([user])).is_empty());
    }

    #[test]
    fn todo_requires_boolean_completed() {
        let violations = TODO.validate(&json!({"userId": 1, "id": 1, "title": "x", "completed": "yes"}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/completed");
    }

    #[test]
    fn empty_lists_fail_min_items() {
        for schema in [&*POSTS, &*COMMENTS, &*TODOS] {
            let violations = schema.validate(&json!([]));
            assert_eq!(violations[0].keyword, "minItems");
        }
    }

    #[test]
    fn comment_email_format_is_checked() {
        let violations = COMMENT.validate(&json!({"postId": 1, "id": 1, "name": "n", "email": "nope", "body": "b"}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].keyword, "format");
    }
}
