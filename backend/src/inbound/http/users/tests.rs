//! Handler tests against mocked driving ports.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockUsersCommand, MockUsersQuery};
use crate::domain::{Error, UserId};

fn mia() -> User {
    User::try_from_parts(7, "mia.muster@musterfirma.de", "Mia", "Muster").expect("valid user")
}

fn seven() -> UserId {
    UserId::new(7).expect("valid id")
}

#[fixture]
fn query() -> MockUsersQuery {
    MockUsersQuery::new()
}

#[fixture]
fn command() -> MockUsersCommand {
    MockUsersCommand::new()
}

async fn call(
    query: MockUsersQuery,
    command: MockUsersCommand,
    request: actix_test::TestRequest,
) -> actix_web::dev::ServiceResponse {
    let state = HttpState::new(Arc::new(query), Arc::new(command));
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api/v1").configure(configure)),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

#[rstest]
fn update_request_distinguishes_null_from_absent() {
    let request: UpdateUserRequest =
        serde_json::from_value(json!({"email": null, "lastname": "Meier"})).expect("valid body");

    assert_eq!(request.email, Some(None));
    assert_eq!(request.firstname, None);
    assert_eq!(request.lastname, Some(Some("Meier".to_owned())));
}

#[rstest]
fn create_request_rejects_unknown_fields() {
    let result = serde_json::from_value::<CreateUserRequest>(json!({
        "email": "mia.muster@musterfirma.de",
        "firstname": "Mia",
        "lastname": "Muster",
        "id": 3,
    }));

    assert!(result.is_err());
}

#[rstest]
#[actix_web::test]
async fn list_returns_json_array(mut query: MockUsersQuery, command: MockUsersCommand) {
    query.expect_list_users().returning(|| Ok(vec![mia()]));

    let response = call(query, command, actix_test::TestRequest::get().uri("/api/v1/users")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body,
        json!([{"id": 7, "email": "mia.muster@musterfirma.de", "firstname": "Mia", "lastname": "Muster"}])
    );
}

#[rstest]
#[actix_web::test]
async fn fetch_rejects_non_numeric_id(query: MockUsersQuery, command: MockUsersCommand) {
    let response = call(
        query,
        command,
        actix_test::TestRequest::get().uri("/api/v1/user/abc"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "invalid_id");
}

#[rstest]
#[actix_web::test]
async fn fetch_missing_user_has_empty_body(mut query: MockUsersQuery, command: MockUsersCommand) {
    query
        .expect_fetch_user()
        .with(eq(seven()))
        .returning(|id| Err(Error::not_found(format!("user {id} not found"))));

    let response = call(query, command, actix_test::TestRequest::get().uri("/api/v1/user/7")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = actix_test::read_body(response).await;
    assert!(body.is_empty());
}

#[rstest]
#[actix_web::test]
async fn unavailable_store_maps_to_503(mut query: MockUsersQuery, command: MockUsersCommand) {
    query
        .expect_list_users()
        .returning(|| Err(Error::service_unavailable("user repository unavailable")));

    let response = call(query, command, actix_test::TestRequest::get().uri("/api/v1/users")).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "service_unavailable");
}

#[rstest]
#[actix_web::test]
async fn create_passes_draft_and_returns_201(query: MockUsersQuery, mut command: MockUsersCommand) {
    command
        .expect_create_user()
        .withf(|draft| draft.firstname.as_deref() == Some("Mia") && draft.email.is_some())
        .returning(|_| Ok(mia()));

    let response = call(
        query,
        command,
        actix_test::TestRequest::post()
            .uri("/api/v1/user")
            .set_json(CreateUserRequest {
                email: Some("mia.muster@musterfirma.de".into()),
                firstname: Some("Mia".into()),
                lastname: Some("Muster".into()),
            }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], 7);
}

#[rstest]
#[case("")]
#[case("{not json")]
#[case(r#"{"email":"a@b.de","firstname":"A","lastname":"B","role":"admin"}"#)]
#[actix_web::test]
async fn create_rejects_unusable_bodies(
    #[case] payload: &'static str,
    query: MockUsersQuery,
    mut command: MockUsersCommand,
) {
    command.expect_create_user().never();

    let response = call(
        query,
        command,
        actix_test::TestRequest::post()
            .uri("/api/v1/user")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn update_unknown_id_wins_over_malformed_body(
    mut query: MockUsersQuery,
    mut command: MockUsersCommand,
) {
    query
        .expect_fetch_user()
        .returning(|id| Err(Error::not_found(format!("user {id} not found"))));
    command.expect_update_user().never();

    let response = call(
        query,
        command,
        actix_test::TestRequest::patch()
            .uri("/api/v1/user/7")
            .set_payload("{broken"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn update_existing_user_with_malformed_body_is_400(
    mut query: MockUsersQuery,
    mut command: MockUsersCommand,
) {
    query.expect_fetch_user().returning(|_| Ok(mia()));
    command.expect_update_user().never();

    let response = call(
        query,
        command,
        actix_test::TestRequest::patch()
            .uri("/api/v1/user/7")
            .set_payload("{broken"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn update_returns_204_without_body(query: MockUsersQuery, mut command: MockUsersCommand) {
    command
        .expect_update_user()
        .withf(|id, draft| {
            id.get() == 7 && draft.lastname == Some(Some("Meier".to_owned())) && draft.email.is_none()
        })
        .returning(|_, _| Ok(mia()));

    let response = call(
        query,
        command,
        actix_test::TestRequest::patch()
            .uri("/api/v1/user/7")
            .set_json(json!({"lastname": "Meier"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(actix_test::read_body(response).await.is_empty());
}

#[rstest]
#[actix_web::test]
async fn delete_returns_200_without_body(query: MockUsersQuery, mut command: MockUsersCommand) {
    command
        .expect_delete_user()
        .with(eq(seven()))
        .returning(|_| Ok(()));

    let response = call(
        query,
        command,
        actix_test::TestRequest::delete().uri("/api/v1/user/7"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(actix_test::read_body(response).await.is_empty());
}

#[rstest]
#[actix_web::test]
async fn delete_rejects_zero_id(query: MockUsersQuery, mut command: MockUsersCommand) {
    command.expect_delete_user().never();

    let response = call(
        query,
        command,
        actix_test::TestRequest::delete().uri("/api/v1/user/0"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
