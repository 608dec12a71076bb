//! Interaction-cycle middleware for tower applications.
//!
//! This module provides [`CycleLayer`], which gives every request a fresh
//! [`Session`](crate::Session) rehydrated from the process cache.

use http::{HeaderName, HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::session::{Inner, Session};
use crate::store::CacheStore;
use crate::sync::rehydrate;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

/// Response header carrying the id of the cycle that produced the response.
pub const CYCLE_ID_HEADER: HeaderName = HeaderName::from_static("x-cycle-id");

/// A Tower Middleware that opens one interaction cycle per request.
#[derive(Debug)]
pub struct CycleService<S, C> {
    inner: S,
    cache: Arc<C>,
}

impl<S: Clone, C> Clone for CycleService<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<ReqBody, ResBody, S, C> Service<Request<ReqBody>> for CycleService<S, C>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    C: CacheStore,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let inner_session = Arc::new(Inner::new());
        rehydrate(&Session::new(Arc::clone(&inner_session)), self.cache.as_ref());
        req.extensions_mut().insert(Arc::clone(&inner_session));

        ResponseFuture {
            future: self.inner.call(req),
            inner_session,
        }
    }
}

/// Layer to apply [`CycleService`] middleware.
///
/// # Example
///
/// ```rust
/// use provider_console::CycleLayer;
/// use provider_console::store::ProcessCache;
/// use std::sync::Arc;
///
/// let cache = Arc::new(ProcessCache::new());
/// let layer = CycleLayer::new(cache);
/// ```
#[derive(Debug)]
pub struct CycleLayer<C> {
    cache: Arc<C>,
}

impl<C> Clone for CycleLayer<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C> CycleLayer<C>
where
    C: CacheStore,
{
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }
}

impl<S, C> Layer<S> for CycleLayer<C>
where
    C: CacheStore,
{
    type Service = CycleService<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        CycleService {
            inner,
            cache: Arc::clone(&self.cache),
        }
    }
}

pin_project! {
    /// Response future for [`CycleService`].
    #[derive(Debug)]
    pub struct ResponseFuture<F> {
        #[pin]
        future: F,
        inner_session: Arc<Inner>,
    }
}

impl<F, Body, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<Body>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut res = ready!(this.future.poll(cx)?);

        let id = this.inner_session.id;
        if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
            res.headers_mut().insert(CYCLE_ID_HEADER, value);
        }

        if Session::new(Arc::clone(this.inner_session)).is_changed() {
            tracing::debug!(cycle = %id, "cycle ended with session changes that were not persisted");
        }

        Poll::Ready(Ok(res))
    }
}
