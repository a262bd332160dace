//! HTTP delivery layer for the rank catalog.
//!
//! Routes translate requests into controller calls and controller results
//! into status codes and JSON bodies.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ServerArgs, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{connect_pool, create_router, run_server};
pub use state::AppState;
