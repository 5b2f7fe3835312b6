//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/user/{userId}
//! POST   /api/v1/user          {"email":"...","firstname":"...","lastname":"..."}
//! PATCH  /api/v1/user/{userId} {"lastname":"..."}
//! DELETE /api/v1/user/{userId}
//! ```
//!
//! Bodies are read as raw bytes and parsed inside the handler so that
//! `PATCH` can resolve the target user before looking at the body.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{User, UserDraft, UserPatchDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_json_body, parse_user_id};

/// Request body for `POST /api/v1/user`.
///
/// Example JSON:
/// `{"email":"mia.muster@musterfirma.de","firstname":"Mia","lastname":"Muster"}`
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[schema(value_type = String, example = "mia.muster@musterfirma.de")]
    pub email: Option<String>,
    #[schema(value_type = String, example = "Mia")]
    pub firstname: Option<String>,
    #[schema(value_type = String, example = "Muster")]
    pub lastname: Option<String>,
}

impl From<CreateUserRequest> for UserDraft {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            email: value.email,
            firstname: value.firstname,
            lastname: value.lastname,
        }
    }
}

/// Request body for `PATCH /api/v1/user/{userId}`.
///
/// Omitted fields keep their stored value; `null` is rejected as blank.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "mia.meier@musterfirma.de")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub firstname: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "Meier")]
    pub lastname: Option<Option<String>>,
}

/// Marks a key as submitted, keeping an explicit `null` as `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<UpdateUserRequest> for UserPatchDraft {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            email: value.email,
            firstname: value.firstname,
            lastname: value.lastname,
        }
    }
}

/// List every user ordered by id.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_api::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users, possibly empty", body = [UserSchema]),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/user/{userId}",
    params(("userId" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The user", body = UserSchema),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 404, description = "No such user; empty body"),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "fetchUser"
)]
#[get("/user/{userId}")]
pub async fn fetch_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.fetch_user(id).await?;
    Ok(web::Json(user))
}

/// Create a user from a complete body.
#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created; the stored user with its new id", body = UserSchema),
        (status = 400, description = "Missing, malformed, or invalid body", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/user")]
pub async fn create_user(state: web::Data<HttpState>, body: web::Bytes) -> ApiResult<HttpResponse> {
    let request: CreateUserRequest = parse_json_body(&body)?;
    let user = state.users_command.create_user(request.into()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Partially update a user.
///
/// An unknown id yields 404 before the body is inspected.
#[utoipa::path(
    patch,
    path = "/api/v1/user/{userId}",
    params(("userId" = i64, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Malformed id or invalid body", body = ErrorSchema),
        (status = 404, description = "No such user; empty body"),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/user/{userId}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let request: UpdateUserRequest = match parse_json_body(&body) {
        Ok(request) => request,
        Err(err) => {
            state.users_query.fetch_user(id).await?;
            return Err(err);
        }
    };
    state.users_command.update_user(id, request.into()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Permanently delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/user/{userId}",
    params(("userId" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deleted; empty body"),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 404, description = "No such user; empty body"),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/user/{userId}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users_command.delete_user(id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the user endpoints on a scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use user_api::inbound::http::users::configure;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(fetch_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}

#[cfg(test)]
mod tests;
