#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        extract::Request,
        http::{StatusCode, header::AUTHORIZATION},
        response::IntoResponse,
        routing::post,
    };
    use parking_lot::Mutex;
    use provider_console::api::{Error, Period, ResourceId, SlotAction};
    use provider_console::{
        ApiConfig, AuthHeaders, CacheRecord, CacheStore, HttpReservationApi, Inner, LoginError,
        ProcessCache, ReservationApi, Session, login,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        method: String,
        path: String,
        authorization: Option<String>,
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    /// Serves `app` on an ephemeral port and returns a client pointed at it.
    async fn serve(app: Router) -> HttpReservationApi {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ApiConfig::new(format!("http://{addr}/api/").parse().unwrap());
        HttpReservationApi::new(config).unwrap()
    }

    /// Records every request and answers with `status` and `body`.
    fn recording_app(log: Log, status: StatusCode, body: Value) -> Router {
        Router::new().fallback(move |req: Request| {
            let log = log.clone();
            let body = body.clone();
            async move {
                log.lock().push(Seen {
                    method: req.method().to_string(),
                    path: req.uri().path().to_string(),
                    authorization: req
                        .headers()
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                });
                (status, Json(body)).into_response()
            }
        })
    }

    #[tokio::test]
    async fn test_login_posts_owner_credentials() {
        let app = Router::new().route(
            "/api/accounts/login/owner/",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(
                    body,
                    json!({"owner_email": "owner@mail.com", "owner_password": "pw"})
                );
                Json(json!({"access_token": "a-1", "refresh_token": "r-1"}))
            }),
        );
        let api = serve(app).await;

        let tokens = api.login("owner@mail.com", "pw").await.unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("a-1"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("r-1"));
    }

    #[tokio::test]
    async fn test_login_rejection_message() {
        let log = Log::default();
        let api = serve(recording_app(
            log.clone(),
            StatusCode::UNAUTHORIZED,
            json!({"message": "invalid credentials"}),
        ))
        .await;

        match api.login("owner@mail.com", "bad").await {
            Err(Error::Rejected { status, message }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "invalid credentials");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_rejection_without_message() {
        let api = serve(recording_app(
            Log::default(),
            StatusCode::BAD_REQUEST,
            json!({"detail": "nope"}),
        ))
        .await;

        let err = api.login("owner@mail.com", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "server response error");
    }

    #[tokio::test]
    async fn test_authenticated_endpoints() {
        let log = Log::default();
        let api = serve(recording_app(log.clone(), StatusCode::OK, json!({}))).await;
        let headers = AuthHeaders::bearer("tok");
        let store = ResourceId::Int(12);
        let slot = ResourceId::Int(5);

        api.fetch_identity(&headers).await.unwrap();
        api.fetch_timeline(&headers, &store).await.unwrap();
        api.fetch_stats(&headers, &store, Period::LastMonth)
            .await
            .unwrap();
        api.update_slot_status(&headers, &slot, SlotAction::Close)
            .await
            .unwrap();
        api.update_slot_status(&headers, &slot, SlotAction::Open)
            .await
            .unwrap();
        api.cancel_reservation(&headers, &slot, &ResourceId::Text("r-9".into()))
            .await
            .unwrap();

        let seen: Vec<(String, String)> = log
            .lock()
            .iter()
            .map(|s| (s.method.clone(), s.path.clone()))
            .collect();
        let expected = [
            ("GET", "/api/stores/me/owner/"),
            ("GET", "/api/reservations/me/owner/12"),
            ("GET", "/api/stores/12/30/stats"),
            ("PATCH", "/api/reservations/5/sold_out/"),
            ("PATCH", "/api/reservations/5/restock/"),
            ("DELETE", "/api/reservations/5/r-9/cancel/"),
        ];
        assert_eq!(
            seen,
            expected
                .iter()
                .map(|(m, p)| (m.to_string(), p.to_string()))
                .collect::<Vec<_>>()
        );
        assert!(
            log.lock()
                .iter()
                .all(|s| s.authorization.as_deref() == Some("Bearer tok"))
        );
    }

    #[tokio::test]
    async fn test_non_ok_status_is_an_error() {
        let api = serve(recording_app(
            Log::default(),
            StatusCode::NO_CONTENT,
            json!(null),
        ))
        .await;
        let headers = AuthHeaders::bearer("tok");
        let slot = ResourceId::Int(5);

        match api.update_slot_status(&headers, &slot, SlotAction::Close).await {
            Err(Error::Status(status)) => assert_eq!(status, StatusCode::NO_CONTENT),
            other => panic!("unexpected result: {other:?}"),
        }

        let api = serve(recording_app(
            Log::default(),
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({}),
        ))
        .await;
        assert!(matches!(
            api.fetch_timeline(&headers, &ResourceId::Int(1)).await,
            Err(Error::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_stats_tolerate_loose_values() {
        let api = serve(recording_app(
            Log::default(),
            StatusCode::OK,
            json!({
                "total_revenue": {"value": 125000, "delta": 12.5},
                "total_reservations_count": {"value": 40, "delta": "-"},
                "time_idx_and_discount_rate": [
                    {"discount_rate": "20", "time_offset_idx": 3},
                    {"discount_rate": null, "time_offset_idx": "x"}
                ],
                "menu_statistics": [{"name": "Bagel", "count": "7"}]
            }),
        ))
        .await;

        let stats = api
            .fetch_stats(&AuthHeaders::bearer("tok"), &ResourceId::Int(1), Period::LastWeek)
            .await
            .unwrap();
        assert_eq!(stats.total_revenue.value, 125000.0);
        assert_eq!(stats.time_idx_and_discount_rate[0].discount_rate, Some(20.0));
        assert_eq!(stats.time_idx_and_discount_rate[1].time_offset_idx, None);
        assert!(stats.hourly_statistics.is_none());
        assert_eq!(stats.menu_statistics.unwrap()[0].count(), 7.0);
    }

    #[tokio::test]
    async fn test_login_against_unreachable_api() {
        // Grab a free port, then close it so nothing is listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ApiConfig::new(format!("http://{addr}/api/").parse().unwrap())
            .with_timeout(Duration::from_secs(2));
        let api = HttpReservationApi::new(config).unwrap();
        let session = Session::new(Arc::new(Inner::new()));
        let cache = ProcessCache::new();

        let err = login(&api, &session, &cache, "owner@mail.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::Connection(_)), "{err:?}");
        assert!(err.to_string().starts_with("API connection error: "));
        assert!(session.is_empty());
        assert_eq!(cache.snapshot(), CacheRecord::default());
    }
}
