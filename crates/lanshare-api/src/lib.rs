//! LAN Share API Library
//!
//! HTTP surface of the file-sharing service: handlers, error mapping, application state
//! and startup.

mod api_doc;
mod handlers;

pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
