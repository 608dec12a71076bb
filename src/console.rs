//! The provider console: what the presentation layer calls.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::api::{Period, ReservationApi, ResourceId, SlotAction, Stats, Timeline};
use crate::auth::{self, AuthHeaders, LoginError, Transition};
use crate::session::{Field, Session};
use crate::stats::StatsView;
use crate::store::CacheStore;
use crate::sync;
use crate::timeline::TimelineView;

/// What to show at the start of a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Login,
    Dashboard { store_name: Option<String> },
    /// Logged in, but the store identity is missing. The owner has to log in
    /// again.
    MissingStore,
}

/// Couples a [`ReservationApi`] with the process-wide [`CacheStore`].
///
/// One console serves every cycle of the process; the per-cycle [`Session`] is
/// passed to each call.
#[derive(Debug)]
pub struct Console<A, C> {
    api: A,
    cache: Arc<C>,
}

impl<A, C> Console<A, C>
where
    A: ReservationApi,
    C: CacheStore,
{
    pub fn new(api: A, cache: Arc<C>) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn rehydrate(&self, session: &Session) {
        sync::rehydrate(session, self.cache.as_ref());
    }

    pub fn persist(&self, session: &Session) {
        sync::persist(session, self.cache.as_ref());
    }

    pub fn auth_headers(&self, session: &Session) -> Option<AuthHeaders> {
        auth::auth_headers(session, self.cache.as_ref())
    }

    pub async fn login(
        &self,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<Transition, LoginError> {
        auth::login(&self.api, session, self.cache.as_ref(), email, password).await
    }

    pub fn logout(&self, session: &Session) -> Transition {
        auth::logout(session, self.cache.as_ref())
    }

    /// Decides which page a rehydrated session lands on.
    ///
    /// A session without `logged_in` is marked logged out.
    pub fn enter(&self, session: &Session) -> Page {
        if !session.contains(Field::LoggedIn) {
            session.set_logged_in(false);
        }

        if !session.logged_in() {
            return Page::Login;
        }

        if session.store_id().is_some() {
            Page::Dashboard {
                store_name: session.store_name(),
            }
        } else {
            tracing::warn!(cycle = %session.id(), "logged in without a store id");
            Page::MissingStore
        }
    }

    /// Fetches the raw timeline, or `None` when not authenticated, when no
    /// store is known, or when the API fails.
    #[tracing::instrument(name = "loading timeline", skip_all, fields(cycle = %session.id()))]
    pub async fn timeline(&self, session: &Session) -> Option<Timeline> {
        let (headers, store_id) = self.store_credentials(session)?;
        self.api
            .fetch_timeline(&headers, &store_id)
            .await
            .map_err(|err| tracing::error!(err = %err, "failed to fetch timeline"))
            .ok()
    }

    pub async fn timeline_view(&self, session: &Session) -> Option<TimelineView> {
        let timeline = self.timeline(session).await?;
        Some(TimelineView::build(&timeline, Utc::now()))
    }

    /// Fetches statistics for `period`, with the same absence rules as
    /// [`timeline`](Self::timeline).
    #[tracing::instrument(name = "loading stats", skip(self, session), fields(cycle = %session.id()))]
    pub async fn stats(&self, session: &Session, period: Period) -> Option<Stats> {
        let (headers, store_id) = self.store_credentials(session)?;
        self.api
            .fetch_stats(&headers, &store_id, period)
            .await
            .map_err(|err| tracing::error!(err = %err, "failed to fetch stats"))
            .ok()
    }

    pub async fn stats_view(&self, session: &Session, period: Period) -> Option<StatsView> {
        let stats = self.stats(session, period).await?;
        Some(StatsView::build(&stats, period))
    }

    /// Closes or reopens a slot. Returns `true` on success.
    #[tracing::instrument(name = "changing slot status", skip(self, session), fields(cycle = %session.id()))]
    pub async fn update_slot_status(
        &self,
        session: &Session,
        slot_id: &ResourceId,
        action: SlotAction,
    ) -> bool {
        let Some(headers) = self.auth_headers(session) else {
            return false;
        };
        self.api
            .update_slot_status(&headers, slot_id, action)
            .await
            .map_err(|err| tracing::error!(err = %err, "failed to update slot status"))
            .is_ok()
    }

    /// Cancels a guest's reservation. Returns `true` on success.
    #[tracing::instrument(name = "cancelling reservation", skip(self, session), fields(cycle = %session.id()))]
    pub async fn cancel_reservation(
        &self,
        session: &Session,
        slot_id: &ResourceId,
        reservation_id: &ResourceId,
    ) -> bool {
        let Some(headers) = self.auth_headers(session) else {
            return false;
        };
        self.api
            .cancel_reservation(&headers, slot_id, reservation_id)
            .await
            .map_err(|err| tracing::error!(err = %err, "failed to cancel reservation"))
            .is_ok()
    }

    fn store_credentials(&self, session: &Session) -> Option<(AuthHeaders, ResourceId)> {
        let Some(headers) = self.auth_headers(session) else {
            tracing::error!("no auth headers, check the login state");
            return None;
        };
        let Some(store_id) = session.store_id() else {
            tracing::error!("no store id, check the login and store link");
            return None;
        };
        Some((headers, store_id))
    }
}
