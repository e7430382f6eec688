//! REST API implementation.
//!
//! - `state`: shared services handed to every handler
//! - `types`: request/response bodies
//! - `errors`: mapping of service errors onto HTTP statuses
//! - `routes`: the handlers themselves

pub mod errors;
pub mod routes;
pub mod state;
pub mod types;

pub use errors::ApiError;
pub use state::ApiState;
