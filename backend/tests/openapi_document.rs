//! The generated OpenAPI document describes every user operation.

use rstest::rstest;
use serde_json::Value;
use utoipa::OpenApi;

use user_api::ApiDoc;

fn document() -> Value {
    serde_json::to_value(ApiDoc::openapi()).expect("document serialises")
}

#[rstest]
#[case("/api/v1/users", "get", "listUsers", &["200"])]
#[case("/api/v1/user/{userId}", "get", "fetchUser", &["200", "400", "404"])]
#[case("/api/v1/user", "post", "createUser", &["201", "400"])]
#[case("/api/v1/user/{userId}", "patch", "updateUser", &["204", "400", "404"])]
#[case("/api/v1/user/{userId}", "delete", "deleteUser", &["200", "400", "404"])]
fn user_operation_is_documented(
    #[case] path: &str,
    #[case] method: &str,
    #[case] operation_id: &str,
    #[case] statuses: &[&str],
) {
    let doc = document();
    let operation = &doc["paths"][path][method];

    assert_eq!(operation["operationId"], operation_id);
    for status in statuses {
        assert!(
            operation["responses"].get(*status).is_some(),
            "{method} {path} should document {status}"
        );
    }
}

#[rstest]
fn health_checks_are_documented() {
    let doc = document();

    assert!(doc["paths"]["/health/ready"]["get"].is_object());
    assert!(doc["paths"]["/health/live"]["get"].is_object());
}

#[rstest]
fn user_schema_exposes_four_fields() {
    let doc = document();
    let properties = &doc["components"]["schemas"]["crate.domain.User"]["properties"];

    for field in ["id", "email", "firstname", "lastname"] {
        assert!(properties.get(field).is_some(), "User schema lacks {field}");
    }
}
