//! SmartDoc API Library
//!
//! HTTP surface of the document preview service: handlers, middleware, session
//! registry and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
mod telemetry;
mod utils;

pub mod error;
pub mod services;
pub mod session;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::process::{ProcessRequest, ProcessResponse};
pub use handlers::upload::UploadResponse;
