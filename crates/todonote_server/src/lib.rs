//! HTTP server for todonote.
//!
//! Serves the notes REST API under `/api` and the browser front-end from a
//! static directory. The JSON data file is the source of truth.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::create_router;
pub use server::{run_from_env, TodoServer};
pub use state::AppState;
