//! HTTP service that keeps a Notion database of treats in sync with callers.
//!
//! # Overview
//! `POST /update-treat` upserts a batch of flat treat records keyed by
//! `Treat Name`; `GET /read-treats` exports the whole database. All remote
//! calls go through one `TreatStore` built at startup and shared with the
//! handlers through axum state.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod sync;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use routes::{app, AppState};
pub use store::{StoreError, TreatStore};
pub use sync::{export_treats, upsert_treats, UpsertSummary};
pub use transport::{Transport, TransportError, UreqTransport};

pub async fn run(listener: TcpListener, store: Arc<TreatStore>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}
