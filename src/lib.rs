//! # Provider console: session caching for a reservation dashboard
//!
//! `provider_console` keeps a store owner's credentials alive across the
//! interaction cycles of a dashboard. Each cycle gets a fresh, request-scoped
//! [`Session`]; a process-wide [`CacheStore`] outlives the cycles and is used
//! to refill every new session.
//!
//! The flow of one cycle:
//!
//! 1. [`rehydrate`] fills the missing session fields from the cache.
//! 2. Views call [`auth_headers`] to authenticate calls to the reservation API.
//! 3. [`login`] and [`logout`] change the session, keep the cache in step with
//!    [`persist`] or [`CacheStore::reset`], and return a [`Transition`] that
//!    asks the presentation layer to start a new cycle.
//!
//! # Quick Start
//!
//! With the `axum` feature (enabled by default), [`web::router`] serves the
//! console as JSON routes behind a [`CycleLayer`]:
//!
//! ```rust,no_run
//! use provider_console::{ApiConfig, Console, HttpReservationApi, ProcessCache};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = HttpReservationApi::new(ApiConfig::from_env()?)?;
//!     let console = Arc::new(Console::new(api, Arc::new(ProcessCache::new())));
//!
//!     let app = provider_console::web::router(console);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Without a web framework
//!
//! The session operations are plain functions over a [`Session`] and a cache:
//!
//! ```rust
//! use provider_console::{ProcessCache, Session, persist, rehydrate};
//!
//! let cache = ProcessCache::new();
//!
//! let first = Session::default();
//! first.set_tokens(Some("access".into()), Some("refresh".into()));
//! first.set_logged_in(true);
//! persist(&first, &cache);
//!
//! // A later cycle starts empty and recovers the credentials.
//! let next = Session::default();
//! rehydrate(&next, &cache);
//! assert!(next.logged_in());
//! assert_eq!(next.access_token().as_deref(), Some("access"));
//! ```

pub mod api;
pub use api::{HttpReservationApi, ReservationApi};

pub mod auth;
pub use auth::{AuthHeaders, LoginError, Transition, auth_headers, login, logout};

pub mod config;
pub use config::ApiConfig;

mod console;
pub use console::{Console, Page};

#[cfg(feature = "axum")]
mod extract;

mod service;
pub use service::*;

mod session;
pub use session::*;

pub mod stats;

pub mod store;
pub use store::{CacheRecord, CacheStore, ProcessCache};

mod sync;
pub use sync::{persist, rehydrate};

pub mod timeline;

#[cfg(feature = "axum")]
pub mod web;
