//! Clinic HTTP API.
//!
//! JSON endpoints for every screen of the clinic front end. Routes are
//! nested under `/api/` and protected by a middleware stack:
//! Session → Audit → Handler. Login and health are the only open routes.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, start_api_server, ApiServer, ServerError};
pub use types::ApiContext;
