use std::sync::Arc;

use axum_core::extract::FromRequestParts;
use http::{StatusCode, request::Parts};

use crate::session::{Inner, Session};

/// Axum Extractor for the [`Session`] of the current cycle.
///
/// Requires [`CycleLayer`](crate::CycleLayer) on the route.
impl<S> FromRequestParts<S> for Session
where
    S: Sync + Send,
{
    type Rejection = (StatusCode, &'static str);

    #[tracing::instrument(name = "session", skip(parts, _state))]
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let inner_session = parts
            .extensions
            .get::<Arc<Inner>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("cycle layer not found in the request extensions");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "cycle layer not found in the request extensions",
                )
            })?;

        Ok(Session::new(inner_session))
    }
}
