use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    error::{ApiError, Operation, RouteError, UserError},
    state::AppState,
    users::dto::{CreateUserRequest, CreatedUserResponse, MessageResponse, UpdateUserRequest},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            post(create_user)
                .get(list_users)
                .fallback(|| async { RouteError::MethodNotAllowed }),
        )
        .route(
            "/users/:id",
            put(update_user)
                .delete(delete_user)
                .fallback(unsupported_id_method),
        )
}

/// Integer `{id}` path segment. Anything that is not a plain decimal fitting
/// the id column is a 404, the same as an unrouted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = RouteError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| RouteError::NotFound)?;
        parse_user_id(&raw).map(UserId).ok_or_else(|| {
            warn!(segment = %raw, "non-integer user id");
            RouteError::NotFound
        })
    }
}

pub(crate) fn parse_user_id(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable create body");
        ApiError::new(Operation::Create, UserError::InvalidBody(e.body_text()))
    })?;

    let name = state
        .users
        .create(payload)
        .await
        .map_err(|e| ApiError::new(Operation::Create, e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            message: "User created successfully",
            name,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = state
        .users
        .list_all()
        .await
        .map_err(|e| ApiError::new(Operation::List, e))?;

    if users.is_empty() {
        return Ok(Json(MessageResponse::new("No users found")).into_response());
    }
    Ok(Json(users).into_response())
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable update body");
        ApiError::new(Operation::Update, UserError::InvalidBody(e.body_text()))
    })?;

    state
        .users
        .update(id, payload.into())
        .await
        .map_err(|e| ApiError::new(Operation::Update, e))?;

    Ok(Json(MessageResponse::new(format!(
        "User ID {id} updated successfully"
    ))))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .users
        .delete(id)
        .await
        .map_err(|e| ApiError::new(Operation::Delete, e))?;

    Ok(Json(MessageResponse::new(format!(
        "User ID {id} deleted successfully"
    ))))
}

/// Methods not routed on `/users/:id`: a bad id wins over the method.
async fn unsupported_id_method(UserId(_): UserId) -> RouteError {
    RouteError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_decimal_ids() {
        assert_eq!(parse_user_id("0"), Some(0));
        assert_eq!(parse_user_id("42"), Some(42));
        assert_eq!(parse_user_id("007"), Some(7));
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["", "abc", "-1", "+1", "1.5", " 1", "1e3", "2147483648"] {
            assert_eq!(parse_user_id(raw), None, "{raw:?} should be rejected");
        }
    }
}
