//! JSON routes over a [`Console`], one interaction cycle per request.
//!
//! | route | result |
//! |---|---|
//! | `GET /` | the [`Page`](crate::Page) the cycle lands on |
//! | `POST /login` | `303 /` or an error message |
//! | `POST /logout` | `303 /` |
//! | `GET /timeline` | [`TimelineView`](crate::timeline::TimelineView) |
//! | `GET /stats?days=7` | [`StatsView`](crate::stats::StatsView) |
//! | `POST /slots/{slot_id}/close` and `/open` | `204` |
//! | `DELETE /slots/{slot_id}/reservations/{reservation_id}` | `204` |

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::CycleLayer;
use crate::api::{Period, ReservationApi, ResourceId, SlotAction};
use crate::auth::{LoginError, Transition};
use crate::console::Console;
use crate::session::Session;
use crate::store::CacheStore;

type SharedConsole<A, C> = State<Arc<Console<A, C>>>;

/// Builds the router, wrapped in a [`CycleLayer`] over the console's cache.
pub fn router<A, C>(console: Arc<Console<A, C>>) -> Router
where
    A: ReservationApi,
    C: CacheStore,
{
    let cycle_layer = CycleLayer::new(Arc::clone(console.cache()));

    Router::new()
        .route("/", get(index::<A, C>))
        .route("/login", post(login::<A, C>))
        .route("/logout", post(logout::<A, C>))
        .route("/timeline", get(timeline::<A, C>))
        .route("/stats", get(stats::<A, C>))
        .route("/slots/{slot_id}/close", post(close_slot::<A, C>))
        .route("/slots/{slot_id}/open", post(open_slot::<A, C>))
        .route(
            "/slots/{slot_id}/reservations/{reservation_id}",
            delete(cancel_reservation::<A, C>),
        )
        .layer(cycle_layer)
        .with_state(console)
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Not logged in")]
    Unauthenticated,

    #[error("{0}")]
    Login(#[from] LoginError),

    #[error("{0}")]
    BadRequest(String),

    /// The reservation API could not serve the request.
    #[error("{0}")]
    Upstream(&'static str),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthenticated | Self::Login(LoginError::Rejected(_)) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Login(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl IntoResponse for Transition {
    fn into_response(self) -> Response {
        match self {
            Transition::Rerun => Redirect::to("/").into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<u32>,
}

async fn index<A, C>(State(console): SharedConsole<A, C>, session: Session) -> impl IntoResponse
where
    A: ReservationApi,
    C: CacheStore,
{
    Json(console.enter(&session))
}

async fn login<A, C>(
    State(console): SharedConsole<A, C>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Transition, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    Ok(console.login(&session, &form.email, &form.password).await?)
}

async fn logout<A, C>(State(console): SharedConsole<A, C>, session: Session) -> Transition
where
    A: ReservationApi,
    C: CacheStore,
{
    console.logout(&session)
}

async fn timeline<A, C>(
    State(console): SharedConsole<A, C>,
    session: Session,
) -> Result<impl IntoResponse, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    require_login(&session)?;
    console
        .timeline_view(&session)
        .await
        .map(Json)
        .ok_or(WebError::Upstream("Failed to load the reservation timeline."))
}

async fn stats<A, C>(
    State(console): SharedConsole<A, C>,
    session: Session,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    let period = Period::try_from(query.days.unwrap_or(Period::LastWeek.days()))
        .map_err(WebError::BadRequest)?;
    require_login(&session)?;
    console
        .stats_view(&session, period)
        .await
        .map(Json)
        .ok_or(WebError::Upstream("Failed to load statistics."))
}

async fn close_slot<A, C>(
    State(console): SharedConsole<A, C>,
    session: Session,
    Path(slot_id): Path<String>,
) -> Result<StatusCode, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    change_slot(&console, &session, &slot_id, SlotAction::Close).await
}

async fn open_slot<A, C>(
    State(console): SharedConsole<A, C>,
    session: Session,
    Path(slot_id): Path<String>,
) -> Result<StatusCode, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    change_slot(&console, &session, &slot_id, SlotAction::Open).await
}

async fn cancel_reservation<A, C>(
    State(console): SharedConsole<A, C>,
    session: Session,
    Path((slot_id, reservation_id)): Path<(String, String)>,
) -> Result<StatusCode, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    require_login(&session)?;
    let cancelled = console
        .cancel_reservation(&session, &resource_id(&slot_id), &resource_id(&reservation_id))
        .await;
    if cancelled {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WebError::Upstream("Failed to cancel the reservation."))
    }
}

async fn change_slot<A, C>(
    console: &Console<A, C>,
    session: &Session,
    slot_id: &str,
    action: SlotAction,
) -> Result<StatusCode, WebError>
where
    A: ReservationApi,
    C: CacheStore,
{
    require_login(session)?;
    if console
        .update_slot_status(session, &resource_id(slot_id), action)
        .await
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WebError::Upstream("Failed to change the slot status."))
    }
}

fn require_login(session: &Session) -> Result<(), WebError> {
    if session.logged_in() {
        Ok(())
    } else {
        Err(WebError::Unauthenticated)
    }
}

fn resource_id(segment: &str) -> ResourceId {
    segment
        .parse()
        .unwrap_or_else(|never: Infallible| match never {})
}
