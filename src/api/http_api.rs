use http::StatusCode;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::api::{
    Error, LoginRequest, Period, ReservationApi, ResourceId, SlotAction, Stats, StoreIdentity,
    Timeline, TokenPair,
};
use crate::auth::AuthHeaders;
use crate::config::ApiConfig;

const FALLBACK_LOGIN_MESSAGE: &str = "server response error";

/// [`ReservationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReservationApi {
    client: Client,
    config: ApiConfig,
}

impl HttpReservationApi {
    pub fn new(config: ApiConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl ReservationApi for HttpReservationApi {
    #[tracing::instrument(name = "calling login endpoint", skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, Error> {
        let url = self.config.endpoint("accounts/login/owner/");
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                owner_email: email,
                owner_password: password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return decode(response).await;
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| match body.get("message") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .unwrap_or_else(|| FALLBACK_LOGIN_MESSAGE.to_string());

        Err(Error::Rejected { status, message })
    }

    #[tracing::instrument(name = "fetching store identity", skip_all)]
    async fn fetch_identity(&self, headers: &AuthHeaders) -> Result<StoreIdentity, Error> {
        let url = self.config.endpoint("stores/me/owner/");
        let response = self
            .client
            .get(&url)
            .headers(headers.to_header_map()?)
            .send()
            .await?;

        expect_json(response).await
    }

    #[tracing::instrument(name = "fetching timeline", skip(self, headers))]
    async fn fetch_timeline(
        &self,
        headers: &AuthHeaders,
        store_id: &ResourceId,
    ) -> Result<Timeline, Error> {
        let url = self
            .config
            .endpoint(&format!("reservations/me/owner/{store_id}"));
        let response = self
            .client
            .get(&url)
            .headers(headers.to_header_map()?)
            .send()
            .await?;

        expect_json(response).await
    }

    #[tracing::instrument(name = "fetching stats", skip(self, headers))]
    async fn fetch_stats(
        &self,
        headers: &AuthHeaders,
        store_id: &ResourceId,
        period: Period,
    ) -> Result<Stats, Error> {
        let url = self
            .config
            .endpoint(&format!("stores/{store_id}/{}/stats", period.days()));
        let response = self
            .client
            .get(&url)
            .headers(headers.to_header_map()?)
            .send()
            .await?;

        let body: serde_json::Value = expect_json(response).await?;
        tracing::debug!(%body, "stats response");
        serde_json::from_value(body).map_err(|e| Error::Decode(e.to_string()))
    }

    #[tracing::instrument(name = "updating slot status", skip(self, headers))]
    async fn update_slot_status(
        &self,
        headers: &AuthHeaders,
        slot_id: &ResourceId,
        action: SlotAction,
    ) -> Result<(), Error> {
        let url = self
            .config
            .endpoint(&format!("reservations/{slot_id}/{}/", action.endpoint()));
        let response = self
            .client
            .patch(&url)
            .headers(headers.to_header_map()?)
            .send()
            .await?;

        expect_ok(&response)
    }

    #[tracing::instrument(name = "cancelling reservation", skip(self, headers))]
    async fn cancel_reservation(
        &self,
        headers: &AuthHeaders,
        slot_id: &ResourceId,
        reservation_id: &ResourceId,
    ) -> Result<(), Error> {
        let url = self
            .config
            .endpoint(&format!("reservations/{slot_id}/{reservation_id}/cancel/"));
        let response = self
            .client
            .delete(&url)
            .headers(headers.to_header_map()?)
            .send()
            .await?;

        expect_ok(&response)
    }
}

fn expect_ok(response: &Response) -> Result<(), Error> {
    match response.status() {
        StatusCode::OK => Ok(()),
        status => Err(Error::Status(status)),
    }
}

async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    expect_ok(&response)?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    response
        .json::<T>()
        .await
        .map_err(|e| Error::Decode(e.to_string()))
}
