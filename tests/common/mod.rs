#![allow(dead_code)]

use std::sync::Arc;

use http::StatusCode;
use parking_lot::Mutex;
use provider_console::api::{
    Error, Period, ResourceId, SlotAction, Stats, StoreIdentity, Timeline, TokenPair,
};
use provider_console::{AuthHeaders, Console, ProcessCache, ReservationApi};

pub const ACCESS_TOKEN: &str = "access-1";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const STORE_NAME: &str = "Sunny Bakery";

pub fn store_id() -> ResourceId {
    ResourceId::Int(7)
}

/// A call received by [`MockReservationApi`], with the `Authorization` header
/// it carried.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login { email: String },
    FetchIdentity { authorization: Option<String> },
    FetchTimeline { store_id: ResourceId },
    FetchStats { store_id: ResourceId, period: Period },
    UpdateSlotStatus { slot_id: ResourceId, action: SlotAction },
    CancelReservation { slot_id: ResourceId, reservation_id: ResourceId },
}

/// Scripted replies. `None` makes the call fail with a 500.
#[derive(Debug, Clone)]
pub struct Replies {
    /// `Err` carries the message of a 401 rejection.
    pub login: Result<TokenPair, String>,
    pub identity: Option<StoreIdentity>,
    pub timeline: Option<Timeline>,
    pub stats: Option<Stats>,
    pub slot_update: bool,
    pub cancel: bool,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            login: Ok(TokenPair {
                access_token: Some(ACCESS_TOKEN.to_string()),
                refresh_token: Some(REFRESH_TOKEN.to_string()),
            }),
            identity: Some(StoreIdentity {
                store_id: Some(store_id()),
                store_name: Some(STORE_NAME.to_string()),
            }),
            timeline: Some(Timeline::default()),
            stats: Some(Stats::default()),
            slot_update: true,
            cancel: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockReservationApi {
    pub replies: Mutex<Replies>,
    calls: Mutex<Vec<Call>>,
}

impl MockReservationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Replies) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

fn server_error() -> Error {
    Error::Status(StatusCode::INTERNAL_SERVER_ERROR)
}

impl ReservationApi for MockReservationApi {
    async fn login(&self, email: &str, _password: &str) -> Result<TokenPair, Error> {
        self.record(Call::Login {
            email: email.to_string(),
        });
        self.replies
            .lock()
            .login
            .clone()
            .map_err(|message| Error::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message,
            })
    }

    async fn fetch_identity(&self, headers: &AuthHeaders) -> Result<StoreIdentity, Error> {
        self.record(Call::FetchIdentity {
            authorization: headers.get("Authorization").map(str::to_string),
        });
        self.replies.lock().identity.clone().ok_or_else(server_error)
    }

    async fn fetch_timeline(
        &self,
        _headers: &AuthHeaders,
        store_id: &ResourceId,
    ) -> Result<Timeline, Error> {
        self.record(Call::FetchTimeline {
            store_id: store_id.clone(),
        });
        self.replies.lock().timeline.clone().ok_or_else(server_error)
    }

    async fn fetch_stats(
        &self,
        _headers: &AuthHeaders,
        store_id: &ResourceId,
        period: Period,
    ) -> Result<Stats, Error> {
        self.record(Call::FetchStats {
            store_id: store_id.clone(),
            period,
        });
        self.replies.lock().stats.clone().ok_or_else(server_error)
    }

    async fn update_slot_status(
        &self,
        _headers: &AuthHeaders,
        slot_id: &ResourceId,
        action: SlotAction,
    ) -> Result<(), Error> {
        self.record(Call::UpdateSlotStatus {
            slot_id: slot_id.clone(),
            action,
        });
        if self.replies.lock().slot_update {
            Ok(())
        } else {
            Err(server_error())
        }
    }

    async fn cancel_reservation(
        &self,
        _headers: &AuthHeaders,
        slot_id: &ResourceId,
        reservation_id: &ResourceId,
    ) -> Result<(), Error> {
        self.record(Call::CancelReservation {
            slot_id: slot_id.clone(),
            reservation_id: reservation_id.clone(),
        });
        if self.replies.lock().cancel {
            Ok(())
        } else {
            Err(server_error())
        }
    }
}

pub fn build_console(replies: Replies) -> Console<MockReservationApi, ProcessCache> {
    Console::new(
        MockReservationApi::with_replies(replies),
        Arc::new(ProcessCache::new()),
    )
}
