//! Contract of the remote reservation API.
//!
//! The console only talks to the API through [`ReservationApi`].
//! [`HttpReservationApi`] is the production implementation; tests substitute
//! their own.

use std::future::Future;

use http::StatusCode;
use thiserror::Error;

mod http_api;
mod types;

pub use http_api::HttpReservationApi;
pub use types::*;

use crate::auth::AuthHeaders;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API refused the request and explained why.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("API responded with {0}")]
    Status(StatusCode),

    #[error("failed to decode API response: {0}")]
    Decode(String),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
}

/// The calls the console makes against the reservation backend.
///
/// Every call except [`login`](ReservationApi::login) is authenticated with
/// headers produced by [`auth_headers`](crate::auth_headers).
pub trait ReservationApi: Send + Sync + 'static {
    /// Exchanges owner credentials for a token pair.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<TokenPair, Error>> + Send;

    /// Fetches the id and name of the store owned by the caller.
    fn fetch_identity(
        &self,
        headers: &AuthHeaders,
    ) -> impl Future<Output = Result<StoreIdentity, Error>> + Send;

    fn fetch_timeline(
        &self,
        headers: &AuthHeaders,
        store_id: &ResourceId,
    ) -> impl Future<Output = Result<Timeline, Error>> + Send;

    fn fetch_stats(
        &self,
        headers: &AuthHeaders,
        store_id: &ResourceId,
        period: Period,
    ) -> impl Future<Output = Result<Stats, Error>> + Send;

    /// Closes or reopens a slot.
    fn update_slot_status(
        &self,
        headers: &AuthHeaders,
        slot_id: &ResourceId,
        action: SlotAction,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn cancel_reservation(
        &self,
        headers: &AuthHeaders,
        slot_id: &ResourceId,
        reservation_id: &ResourceId,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}
