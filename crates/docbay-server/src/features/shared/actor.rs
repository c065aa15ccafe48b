//! Acting-principal extraction
//!
//! The authenticating gateway in front of docbay verifies credentials and
//! forwards the principal as `x-user-id` / `x-user-role` headers; this
//! extractor turns them into an [`Actor`]. The webhook endpoint is the one
//! route that deliberately skips it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use docbay_common::types::{Actor, UserRole};

use crate::error::AppError;

/// Gateway header carrying the principal id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Gateway header carrying the principal role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Axum extractor for the acting principal.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, USER_ID_HEADER)?
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("x-user-id must be an integer".to_string()))?;

        let role: UserRole = header_value(parts, USER_ROLE_HEADER)?
            .parse()
            .map_err(|_| AppError::Unauthorized("x-user-role is not a known role".to_string()))?;

        Ok(CurrentActor(Actor::new(id, role)))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", name)))?
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("invalid {} header", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<CurrentActor, AppError> {
        let (mut parts, _) = request.into_parts();
        CurrentActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_actor_from_headers() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .header(USER_ROLE_HEADER, "editor")
            .body(())
            .unwrap();

        let CurrentActor(actor) = extract(request).await.unwrap();
        assert_eq!(actor.id, 42);
        assert_eq!(actor.role, UserRole::Editor);
    }

    #[tokio::test]
    async fn test_missing_headers_are_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));

        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .body(())
            .unwrap();
        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_garbage_values_are_unauthorized() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-number")
            .header(USER_ROLE_HEADER, "editor")
            .body(())
            .unwrap();
        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));

        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .header(USER_ROLE_HEADER, "superuser")
            .body(())
            .unwrap();
        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));
    }
}
