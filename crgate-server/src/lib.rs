//! crgate HTTP server - change request approval API
//!
//! Serves the change request catalog, per-request metric reports, mock or
//! directory-backed login and batch approve/reject acknowledgements, with a
//! static file fallback for the web front end.

pub mod api;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod response;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use api::{AuthRequest, AuthResponse, BatchRequest, HealthResponse, MetricsResponse};
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
